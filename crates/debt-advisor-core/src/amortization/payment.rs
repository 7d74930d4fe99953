use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::DebtAdvisorError;
use crate::types::{monthly_rate, Money, Percent, Rate};
use crate::DebtAdvisorResult;

/// Fixed monthly installment that retires `principal` over `term_months`.
///
/// A zero (or negative) rate degrades to straight division.
pub fn compute_fixed_payment(
    principal: Money,
    annual_rate_pct: Percent,
    term_months: u32,
) -> DebtAdvisorResult<Money> {
    if term_months == 0 {
        return Err(DebtAdvisorError::InvalidTerm(0));
    }
    if principal <= Decimal::ZERO {
        return Err(DebtAdvisorError::InvalidPrincipal(principal));
    }

    let r = monthly_rate(annual_rate_pct);
    if r.is_zero() {
        return Ok(principal / Decimal::from(term_months));
    }

    // P / ((1 - (1+r)^-n) / r); the factor lies in (0, n] so the quotient
    // stays near P*r even where (1+r)^n is huge
    let factor = annuity_factor(r, term_months)?;
    principal
        .checked_div(factor)
        .ok_or_else(|| DebtAdvisorError::InvalidInput {
            field: "principal".into(),
            reason: format!("Payment overflows for {term_months} months"),
        })
}

/// Present value of one unit paid monthly for `term_months` at rate `r`.
pub fn annuity_factor(r: Rate, term_months: u32) -> DebtAdvisorResult<Decimal> {
    if r.is_zero() {
        return Ok(Decimal::from(term_months));
    }
    let growth = compound_factor(r, term_months)?;
    // r below Decimal resolution
    if growth == Decimal::ONE {
        return Ok(Decimal::from(term_months));
    }
    Ok((Decimal::ONE - Decimal::ONE / growth) / r)
}

/// `(1 + r)^n`
fn compound_factor(r: Rate, term_months: u32) -> DebtAdvisorResult<Decimal> {
    (Decimal::ONE + r)
        .checked_powi(i64::from(term_months))
        .ok_or_else(|| DebtAdvisorError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Compound factor overflows for {term_months} months"),
        })
}
