use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{simulate_schedule, Schedule};
use crate::types::*;
use crate::DebtAdvisorResult;

/// Margin over first-month interest below which payoff is flagged as slow.
const MINIMUM_PAYMENT_MARGIN: Decimal = dec!(1.01);

/// Input for paying down a revolving balance at a fixed monthly amount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPayoffInput {
    pub balance: Money,
    /// Annual percentage rate, in percent
    pub apr: Percent,
    pub monthly_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPayoffOutput {
    pub months: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub first_month_interest: Money,
    /// First-month interest plus a 1% margin
    pub suggested_minimum_payment: Money,
    pub schedule: Schedule,
}

/// Simulate paying off a card balance at a fixed monthly payment.
pub fn calculate_card_payoff(
    input: &CardPayoffInput,
) -> DebtAdvisorResult<ComputationOutput<CardPayoffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let params = LoanParameters::new(
        input.balance,
        input.apr,
        Repayment::FixedPayment(input.monthly_payment),
    )?;

    let first_month_interest = params.principal() * params.monthly_rate();
    let suggested_minimum_payment = first_month_interest * MINIMUM_PAYMENT_MARGIN;

    // PaymentTooLow surfaces here when the payment cannot cover interest
    let schedule = simulate_schedule(
        params.principal(),
        params.annual_rate_pct(),
        input.monthly_payment,
        MAX_TERM_MONTHS,
    )?;

    if input.monthly_payment < suggested_minimum_payment {
        warnings.push(format!(
            "Payment of {:.2} barely exceeds first-month interest of {:.2}; pay at least {:.2} to make real progress",
            input.monthly_payment, first_month_interest, suggested_minimum_payment
        ));
    }
    if schedule.months() > 120 {
        warnings.push(format!(
            "Payoff takes {} months; consider a larger payment",
            schedule.months()
        ));
    }

    let output = CardPayoffOutput {
        months: schedule.months(),
        total_paid: schedule.total_paid(),
        total_interest: schedule.total_interest(),
        first_month_interest,
        suggested_minimum_payment,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-payment revolving balance payoff simulation",
        &serde_json::json!({
            "balance": input.balance.to_string(),
            "apr": input.apr.to_string(),
            "monthly_payment": input.monthly_payment.to_string(),
            "max_months": MAX_TERM_MONTHS,
        }),
        warnings,
        elapsed,
        output,
    ))
}
