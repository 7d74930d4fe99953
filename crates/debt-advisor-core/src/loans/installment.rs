use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{compute_fixed_payment, compute_fixed_term_schedule, Schedule};
use crate::types::*;
use crate::DebtAdvisorResult;

/// Input for an installment loan with a known term (student, personal, auto)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentLoanInput {
    pub loan_amount: Money,
    pub annual_rate_pct: Percent,
    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentLoanOutput {
    pub monthly_payment: Money,
    pub months: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    /// Interest as a percentage of everything paid
    pub interest_share_pct: Percent,
    pub schedule: Schedule,
}

/// Level-payment amortization of an installment loan.
pub fn calculate_installment_loan(
    input: &InstallmentLoanInput,
) -> DebtAdvisorResult<ComputationOutput<InstallmentLoanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let params = LoanParameters::new(
        input.loan_amount,
        input.annual_rate_pct,
        Repayment::Term(input.term_months),
    )?;

    let monthly_payment = compute_fixed_payment(
        params.principal(),
        params.annual_rate_pct(),
        input.term_months,
    )?;
    let schedule =
        compute_fixed_term_schedule(params.principal(), params.annual_rate_pct(), input.term_months)?;

    if params.annual_rate_pct().is_zero() {
        warnings.push("Zero interest rate: payment is principal divided by term".into());
    }

    let total_paid = schedule.total_paid();
    let total_interest = schedule.total_interest();
    let output = InstallmentLoanOutput {
        monthly_payment,
        months: schedule.months(),
        total_paid,
        total_interest,
        interest_share_pct: interest_share_pct(total_interest, total_paid),
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-installment annuity amortization",
        &serde_json::json!({
            "loan_amount": input.loan_amount.to_string(),
            "annual_rate_pct": input.annual_rate_pct.to_string(),
            "term_months": input.term_months,
            "compounding": "monthly",
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn interest_share_pct(total_interest: Money, total_paid: Money) -> Percent {
    if total_paid.is_zero() {
        Decimal::ZERO
    } else {
        total_interest / total_paid * dec!(100)
    }
}
