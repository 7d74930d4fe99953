//! Amortization engine.
//!
//! Covers:
//! 1. **Fixed payment** -- annuity formula `P*r / (1 - (1+r)^-n)`.
//! 2. **Payoff simulation** -- month-by-month run at a fixed payment until
//!    the balance reaches zero.
//! 3. **Fixed-term schedule** -- exactly `n` installments at the annuity
//!    payment.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

pub mod payment;
pub mod schedule;

pub use payment::compute_fixed_payment;
pub use schedule::{
    compute_fixed_term_schedule, simulate_schedule, AmortizationEntry, Schedule,
};
