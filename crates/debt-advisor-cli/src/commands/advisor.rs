use std::sync::Arc;

use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use debt_advisor_core::analysis::{self, AnalysisInput, Analyzer};
use debt_advisor_core::optimizer::{self, BoostInput};
use debt_advisor_core::predictor::{PrecomputedPrediction, FEATURE_NAMES};
use debt_advisor_core::risk;
use debt_advisor_core::{monthly_rate, LoanParameters, Repayment};

use crate::input;

/// Arguments for risk classification
#[derive(Args)]
pub struct RiskArgs {
    /// Debt-to-income ratio in percent
    #[arg(long)]
    pub dti: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,
}

/// Arguments for the payment boost suggestion
#[derive(Args)]
pub struct BoostArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount outstanding
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Current monthly payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Contractual term in months, reported alongside the suggestion
    #[arg(long, default_value_t = 0)]
    pub term: u32,
}

/// File form of [`BoostArgs`]; the rate is annual percent like everywhere
/// else on the command line.
#[derive(Deserialize)]
struct BoostFileInput {
    principal: Decimal,
    annual_rate_pct: Decimal,
    current_payment: Decimal,
    monthly_income: Decimal,
    #[serde(default)]
    term_months: u32,
}

/// Arguments for a full borrower analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub borrower: BorrowerArgs,

    /// Precomputed predictor output (JSON with regression, classes, labels)
    #[arg(long)]
    pub prediction: Option<String>,
}

/// Borrower figures shared by `analyze` and `features`
#[derive(Args)]
pub struct BorrowerArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount outstanding
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months (defaults to 60 when no payment is given)
    #[arg(long)]
    pub term: Option<u32>,

    /// Monthly payment (derived from the term when omitted)
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Monthly expenses (defaults to half of income)
    #[arg(long)]
    pub expenses: Option<Decimal>,

    /// Months of expenses held in reserve
    #[arg(long)]
    pub emergency_months: Option<Decimal>,

    #[arg(long)]
    pub age: Option<u32>,

    /// Job stability score, 0-100
    #[arg(long)]
    pub job_stability: Option<Decimal>,

    /// Payment history score, 0-100
    #[arg(long)]
    pub payment_history: Option<Decimal>,

    /// Age of the oldest account in months
    #[arg(long)]
    pub account_age: Option<u32>,

    #[arg(long)]
    pub savings: Option<Decimal>,
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assessment = risk::assess(args.dti, args.rate);
    Ok(json!({
        "result": assessment,
        "methodology": "Tiered DTI and interest-rate classification",
    }))
}

pub fn run_boost(args: BoostArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let file_input: BoostFileInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => BoostFileInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            current_payment: args
                .payment
                .ok_or("--payment is required (or provide --input)")?,
            monthly_income: args.income.ok_or("--income is required (or provide --input)")?,
            term_months: args.term,
        },
    };

    // Validate the loan the same way the calculators do before simulating it
    LoanParameters::new(
        file_input.principal,
        file_input.annual_rate_pct,
        Repayment::FixedPayment(file_input.current_payment),
    )?;

    let suggestion = optimizer::suggest_boost(&BoostInput {
        principal: file_input.principal,
        monthly_rate: monthly_rate(file_input.annual_rate_pct),
        current_payment: file_input.current_payment,
        monthly_income: file_input.monthly_income,
        term_months: file_input.term_months,
    });
    Ok(json!({
        "result": suggestion,
        "methodology": "40% debt-service cap with 40% living-cost floor",
    }))
}

fn analysis_input(args: &BorrowerArgs) -> Result<AnalysisInput, Box<dyn std::error::Error>> {
    if let Some(parsed) = input::read_input(args.input.as_deref())? {
        return Ok(parsed);
    }
    Ok(AnalysisInput {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
        term_months: args.term,
        monthly_payment: args.payment,
        monthly_income: args.income,
        monthly_expenses: args.expenses,
        emergency_months: args.emergency_months,
        age: args.age,
        job_stability: args.job_stability,
        payment_history: args.payment_history,
        account_age_months: args.account_age,
        current_savings: args.savings,
    })
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis_input = analysis_input(&args.borrower)?;

    let analyzer = match args.prediction.as_deref() {
        Some(path) => {
            let bundle: PrecomputedPrediction = input::file::read_json(path)?;
            info!(path, "using precomputed prediction");
            Analyzer::with_predictor(Arc::new(bundle))
        }
        None => Analyzer::new(),
    };

    let result = analyzer.analyze(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_features(args: BorrowerArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis_input = analysis_input(&args)?;
    let features = analysis::build_features(&analysis_input)?;

    let rows: Vec<Value> = FEATURE_NAMES
        .iter()
        .zip(features.to_array())
        .enumerate()
        .map(|(index, (name, value))| json!({ "index": index, "feature": name, "value": value }))
        .collect();
    Ok(Value::Array(rows))
}
