use std::sync::Arc;

use napi::Result as NapiResult;
use napi_derive::napi;

use debt_advisor_core::analysis::{AnalysisInput, Analyzer};
use debt_advisor_core::predictor::PrecomputedPrediction;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loan calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn installment_loan(input_json: String) -> NapiResult<String> {
    let input: debt_advisor_core::loans::installment::InstallmentLoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = debt_advisor_core::loans::installment::calculate_installment_loan(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn card_payoff(input_json: String) -> NapiResult<String> {
    let input: debt_advisor_core::loans::card_payoff::CardPayoffInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = debt_advisor_core::loans::card_payoff::calculate_card_payoff(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Plain JS numbers in, schedule entries out. NaN and infinities are
/// rejected before any arithmetic.
#[napi]
pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    term_months: Option<u32>,
    monthly_payment: Option<f64>,
) -> NapiResult<String> {
    use debt_advisor_core::amortization::{compute_fixed_term_schedule, simulate_schedule};
    use debt_advisor_core::{LoanParameters, Repayment, MAX_TERM_MONTHS};

    let params =
        LoanParameters::try_from_f64(principal, annual_rate_pct, term_months, monthly_payment)
            .map_err(to_napi_error)?;
    let schedule = match params.repayment() {
        Repayment::Term(n) => {
            compute_fixed_term_schedule(params.principal(), params.annual_rate_pct(), n)
        }
        Repayment::FixedPayment(p) => simulate_schedule(
            params.principal(),
            params.annual_rate_pct(),
            p,
            MAX_TERM_MONTHS,
        ),
    }
    .map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Advisor
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_risk(dti_pct: f64, annual_rate_pct: f64) -> NapiResult<String> {
    let dti = debt_advisor_core::decimal_from_f64("dti_pct", dti_pct).map_err(to_napi_error)?;
    let rate = debt_advisor_core::decimal_from_f64("annual_rate_pct", annual_rate_pct)
        .map_err(to_napi_error)?;
    let output = debt_advisor_core::risk::assess(dti, rate);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn suggest_boost(input_json: String) -> NapiResult<String> {
    let input: debt_advisor_core::optimizer::BoostInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = debt_advisor_core::optimizer::suggest_boost(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_features(input_json: String) -> NapiResult<String> {
    let input: AnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let features =
        debt_advisor_core::analysis::build_features(&input).map_err(to_napi_error)?;
    serde_json::to_string(&features).map_err(to_napi_error)
}

/// Full analysis. `prediction_json`, when given, is the host's model output
/// for this borrower (regression values, class codes, optional labels).
#[napi]
pub fn analyze_debt(input_json: String, prediction_json: Option<String>) -> NapiResult<String> {
    let input: AnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let analyzer = match prediction_json {
        Some(json) => {
            let bundle: PrecomputedPrediction =
                serde_json::from_str(&json).map_err(to_napi_error)?;
            Analyzer::with_predictor(Arc::new(bundle))
        }
        None => Analyzer::new(),
    };
    let output = analyzer.analyze(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
