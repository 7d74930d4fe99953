use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use debt_advisor_core::amortization::{compute_fixed_term_schedule, simulate_schedule};
use debt_advisor_core::loans::card_payoff::{self, CardPayoffInput};
use debt_advisor_core::loans::installment::{self, InstallmentLoanInput};
use debt_advisor_core::{LoanParameters, Repayment, MAX_TERM_MONTHS};

use crate::input;

/// Arguments for an installment loan
#[derive(Args)]
pub struct InstallmentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate in percent (18 = 18%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,
}

/// Arguments for card payoff simulation
#[derive(Args)]
pub struct CardPayoffArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Annual percentage rate in percent
    #[arg(long)]
    pub apr: Option<Decimal>,

    /// Fixed monthly payment
    #[arg(long)]
    pub payment: Option<Decimal>,
}

/// Arguments for a bare amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount outstanding
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months (exclusive with --payment)
    #[arg(long, conflicts_with = "payment")]
    pub term: Option<u32>,

    /// Fixed monthly payment (exclusive with --term)
    #[arg(long)]
    pub payment: Option<Decimal>,
}

/// File form of [`ScheduleArgs`]
#[derive(Deserialize)]
struct ScheduleInput {
    principal: Decimal,
    annual_rate_pct: Decimal,
    term_months: Option<u32>,
    monthly_payment: Option<Decimal>,
}

pub fn run_installment_loan(args: InstallmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: InstallmentLoanInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => InstallmentLoanInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_months: args.term.ok_or("--term is required (or provide --input)")?,
        },
    };

    let result = installment::calculate_installment_loan(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_card_payoff(args: CardPayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let card_input: CardPayoffInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => CardPayoffInput {
            balance: args.balance.ok_or("--balance is required (or provide --input)")?,
            apr: args.apr.ok_or("--apr is required (or provide --input)")?,
            monthly_payment: args
                .payment
                .ok_or("--payment is required (or provide --input)")?,
        },
    };

    let result = card_payoff::calculate_card_payoff(&card_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_months: args.term,
            monthly_payment: args.payment,
        },
    };

    let repayment = match (schedule_input.term_months, schedule_input.monthly_payment) {
        (Some(_), Some(_)) => return Err("give either a term or a payment, not both".into()),
        (Some(n), None) => Repayment::Term(n),
        (None, Some(p)) => Repayment::FixedPayment(p),
        (None, None) => return Err("--term or --payment is required".into()),
    };
    let params = LoanParameters::new(
        schedule_input.principal,
        schedule_input.annual_rate_pct,
        repayment,
    )?;

    let schedule = match params.repayment() {
        Repayment::Term(n) => {
            compute_fixed_term_schedule(params.principal(), params.annual_rate_pct(), n)?
        }
        Repayment::FixedPayment(p) => simulate_schedule(
            params.principal(),
            params.annual_rate_pct(),
            p,
            MAX_TERM_MONTHS,
        )?,
    };

    // Bare array so table and csv output render one row per month
    Ok(serde_json::to_value(schedule.entries)?)
}
