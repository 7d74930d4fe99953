use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::payment::compute_fixed_payment;
use crate::error::DebtAdvisorError;
use crate::types::{monthly_rate, Money, Percent, Rate, MAX_TERM_MONTHS};
use crate::DebtAdvisorResult;

/// A single month in an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based month index
    pub month: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    /// Balance after this month's payment, never negative
    pub remaining: Money,
}

/// Ordered month-by-month amortization of one balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    pub entries: Vec<AmortizationEntry>,
}

impl Schedule {
    /// Number of months until the balance reaches zero.
    pub fn months(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn total_interest(&self) -> Money {
        self.entries.iter().map(|e| e.interest).sum()
    }

    pub fn total_principal(&self) -> Money {
        self.entries.iter().map(|e| e.principal).sum()
    }

    pub fn total_paid(&self) -> Money {
        self.entries.iter().map(|e| e.payment).sum()
    }

    /// Remaining balance after the last entry.
    pub fn final_balance(&self) -> Money {
        self.entries
            .last()
            .map(|e| e.remaining)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Simulate paying `payment` every month until the balance is gone.
///
/// Fails fast with `PaymentTooLow` when the payment cannot cover the first
/// month's interest, and with `NonConvergent` when `max_months` elapse with
/// a balance still outstanding.
pub fn simulate_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    payment: Money,
    max_months: u32,
) -> DebtAdvisorResult<Schedule> {
    if principal <= Decimal::ZERO {
        return Err(DebtAdvisorError::InvalidPrincipal(principal));
    }
    if payment <= Decimal::ZERO {
        return Err(DebtAdvisorError::InvalidInput {
            field: "payment".into(),
            reason: "Monthly payment must be positive".into(),
        });
    }

    simulate_at_monthly_rate(principal, monthly_rate(annual_rate_pct), payment, max_months)
}

/// `simulate_schedule` with the rate already converted to a monthly decimal.
pub(crate) fn simulate_at_monthly_rate(
    principal: Money,
    r: Rate,
    payment: Money,
    max_months: u32,
) -> DebtAdvisorResult<Schedule> {
    let first_interest = principal * r;
    if payment <= first_interest {
        return Err(DebtAdvisorError::PaymentTooLow {
            payment,
            first_interest,
        });
    }

    let mut entries = Vec::new();
    let mut balance = principal;

    for month in 1..=max_months {
        let interest = balance * r;
        let principal_paid = (payment - interest).min(balance);
        balance -= principal_paid;

        let done = balance <= Decimal::ZERO;
        if done {
            balance = Decimal::ZERO;
        }

        entries.push(AmortizationEntry {
            month,
            payment: interest + principal_paid,
            interest,
            principal: principal_paid,
            remaining: balance,
        });

        if done {
            debug!(months = month, %principal, %payment, "payoff schedule converged");
            return Ok(Schedule { entries });
        }
    }

    Err(DebtAdvisorError::NonConvergent {
        months: max_months,
        remaining: balance,
    })
}

/// Installment schedule for a loan with a known term.
///
/// Runs exactly `term_months` installments at the annuity payment. Rounding
/// residue left after the last installment is folded into that month's
/// principal so the balance closes at zero.
pub fn compute_fixed_term_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    term_months: u32,
) -> DebtAdvisorResult<Schedule> {
    if term_months > MAX_TERM_MONTHS {
        return Err(DebtAdvisorError::InvalidInput {
            field: "term_months".into(),
            reason: "Term cannot exceed 600 months (50 years)".into(),
        });
    }
    let payment = compute_fixed_payment(principal, annual_rate_pct, term_months)?;
    let r = monthly_rate(annual_rate_pct);

    let mut entries = Vec::with_capacity(term_months as usize);
    let mut balance = principal;

    for month in 1..=term_months {
        let interest = balance * r;
        let principal_paid = if month == term_months {
            balance
        } else {
            (payment - interest).min(balance)
        };
        balance = (balance - principal_paid).max(Decimal::ZERO);

        entries.push(AmortizationEntry {
            month,
            payment: interest + principal_paid,
            interest,
            principal: principal_paid,
            remaining: balance,
        });
    }

    debug!(term_months, %payment, "fixed-term schedule built");
    Ok(Schedule { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_term_entry_count_and_close() {
        let sched = compute_fixed_term_schedule(dec!(100_000), dec!(18), 48).unwrap();
        assert_eq!(sched.months(), 48);
        assert_eq!(sched.final_balance(), Decimal::ZERO);
        assert!((sched.total_principal() - dec!(100_000)).abs() < dec!(0.0000001));
        // Every installment but the last is the annuity payment
        assert!((sched.entries[0].payment - dec!(2937.50)).abs() < dec!(0.01));
        assert_eq!(sched.entries[0].interest, dec!(1500));
    }

    #[test]
    fn test_fixed_term_zero_rate() {
        let sched = compute_fixed_term_schedule(dec!(1200), Decimal::ZERO, 12).unwrap();
        for e in &sched.entries {
            assert_eq!(e.interest, Decimal::ZERO);
            assert_eq!(e.payment, dec!(100));
        }
        assert_eq!(sched.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_fixed_term_zero_rate_repeating_division() {
        // 1000 / 3 does not divide evenly; last month absorbs the residue
        let sched = compute_fixed_term_schedule(dec!(1000), Decimal::ZERO, 3).unwrap();
        assert!((sched.total_principal() - dec!(1000)).abs() < dec!(0.0000001));
        assert_eq!(sched.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_fixed_term_rejects_zero_term() {
        assert!(matches!(
            compute_fixed_term_schedule(dec!(1000), dec!(5), 0),
            Err(DebtAdvisorError::InvalidTerm(_))
        ));
    }

    #[test]
    fn test_simulation_pays_off_with_partial_last_month() {
        // 1000 at 0% paying 300/month => 300, 300, 300, 100
        let sched = simulate_schedule(dec!(1000), Decimal::ZERO, dec!(300), 600).unwrap();
        assert_eq!(sched.months(), 4);
        assert_eq!(sched.entries[3].payment, dec!(100));
        assert_eq!(sched.entries[3].remaining, Decimal::ZERO);
        assert_eq!(sched.total_paid(), dec!(1000));
    }

    #[test]
    fn test_simulation_first_month_split() {
        // 10k at 12% => 1% monthly; first interest = 100
        let sched = simulate_schedule(dec!(10_000), dec!(12), dec!(500), 600).unwrap();
        let first = &sched.entries[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.interest, dec!(100));
        assert_eq!(first.principal, dec!(400));
        assert_eq!(first.remaining, dec!(9600));
        assert_eq!(sched.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_simulation_payment_too_low() {
        // 50k at 20%: first interest 833.33 > 800
        let err = simulate_schedule(dec!(50_000), dec!(20), dec!(800), 600).unwrap_err();
        match err {
            DebtAdvisorError::PaymentTooLow {
                payment,
                first_interest,
            } => {
                assert_eq!(payment, dec!(800));
                assert!((first_interest - dec!(833.33)).abs() < dec!(0.01));
            }
            other => panic!("Expected PaymentTooLow, got {other:?}"),
        }
    }

    #[test]
    fn test_simulation_payment_equal_to_interest_is_too_low() {
        // 12k at 12% => interest exactly 120
        assert!(matches!(
            simulate_schedule(dec!(12_000), dec!(12), dec!(120), 600),
            Err(DebtAdvisorError::PaymentTooLow { .. })
        ));
    }

    #[test]
    fn test_simulation_cap_reports_non_convergence() {
        // Converges in 10 months at 0%, but the cap is 5
        let err = simulate_schedule(dec!(1000), Decimal::ZERO, dec!(100), 5).unwrap_err();
        match err {
            DebtAdvisorError::NonConvergent { months, remaining } => {
                assert_eq!(months, 5);
                assert_eq!(remaining, dec!(500));
            }
            other => panic!("Expected NonConvergent, got {other:?}"),
        }
    }

    #[test]
    fn test_simulation_balance_is_non_increasing() {
        let sched = simulate_schedule(dec!(8_000), dec!(24), dec!(250), 600).unwrap();
        for pair in sched.entries.windows(2) {
            assert!(pair[1].remaining <= pair[0].remaining);
        }
    }
}
