//! Financial-health analysis.
//!
//! Derives payment, DTI and payoff schedule from a borrower's loan figures,
//! then runs risk scoring, the payment optimizer and the advice ladder, and
//! merges in the external predictor's output when one is available.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::advice::{generate_advice, AdviceInput, Tip};
use crate::amortization::{compute_fixed_payment, compute_fixed_term_schedule, simulate_schedule, Schedule};
use crate::error::DebtAdvisorError;
use crate::optimizer::{suggest_boost, BoostInput, OptimizationSuggestion};
use crate::predictor::{BorrowerProfile, ExternalPrediction, FeatureVector, Predictor};
use crate::risk::{assess, RiskAssessment};
use crate::types::*;
use crate::DebtAdvisorResult;

/// Term assumed when neither a term nor a payment is supplied.
pub const DEFAULT_TERM_MONTHS: u32 = 60;

const DEFAULT_EXPENSE_SHARE: Decimal = dec!(0.5);
const DEFAULT_AGE: u32 = 30;
const DEFAULT_JOB_STABILITY: Decimal = dec!(70);
const DEFAULT_PAYMENT_HISTORY: Decimal = dec!(80);
const DEFAULT_ACCOUNT_AGE_MONTHS: u32 = 36;

/// Borrower figures for one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub principal: Money,
    pub annual_rate_pct: Percent,
    pub term_months: Option<u32>,
    /// When absent (or zero) the annuity payment for the term is used
    pub monthly_payment: Option<Money>,
    pub monthly_income: Option<Money>,
    pub monthly_expenses: Option<Money>,
    pub emergency_months: Option<Decimal>,
    pub age: Option<u32>,
    /// 0-100
    pub job_stability: Option<Decimal>,
    /// 0-100
    pub payment_history: Option<Decimal>,
    pub account_age_months: Option<u32>,
    pub current_savings: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub risk: RiskAssessment,
    pub tips: Vec<Tip>,
    pub actions: Vec<String>,
    pub monthly_payment: Money,
    pub monthly_interest: Money,
    pub total_interest: Money,
    /// Percent; 0 when income is unknown
    pub dti_ratio: Percent,
    pub payoff_months: u32,
    pub optimization: OptimizationSuggestion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<ExternalPrediction>,
}

/// Figures derived from the input before any scoring happens.
struct LoanFigures {
    params: LoanParameters,
    payment: Money,
    schedule: Schedule,
    income: Money,
    dti: Percent,
    warnings: Vec<String>,
}

fn validate_optional(field: &str, value: Option<Decimal>) -> DebtAdvisorResult<()> {
    match value {
        Some(v) => validate_non_negative(field, v),
        None => Ok(()),
    }
}

fn derive_figures(input: &AnalysisInput) -> DebtAdvisorResult<LoanFigures> {
    validate_optional("monthly_payment", input.monthly_payment)?;
    validate_optional("monthly_income", input.monthly_income)?;
    validate_optional("monthly_expenses", input.monthly_expenses)?;
    validate_optional("emergency_months", input.emergency_months)?;
    validate_optional("current_savings", input.current_savings)?;

    let mut warnings = Vec::new();

    let supplied_payment = input.monthly_payment.filter(|p| *p > Decimal::ZERO);
    let repayment = match supplied_payment {
        Some(payment) => Repayment::FixedPayment(payment),
        None => {
            let term = input.term_months.unwrap_or_else(|| {
                warnings.push(format!(
                    "No term or payment supplied; assuming a {DEFAULT_TERM_MONTHS}-month term"
                ));
                DEFAULT_TERM_MONTHS
            });
            Repayment::Term(term)
        }
    };
    let params = LoanParameters::new(input.principal, input.annual_rate_pct, repayment)?;

    let (payment, schedule) = match params.repayment() {
        Repayment::Term(n) => (
            compute_fixed_payment(params.principal(), params.annual_rate_pct(), n)?,
            compute_fixed_term_schedule(params.principal(), params.annual_rate_pct(), n)?,
        ),
        Repayment::FixedPayment(p) => (
            p,
            simulate_schedule(params.principal(), params.annual_rate_pct(), p, MAX_TERM_MONTHS)?,
        ),
    };

    let income = input.monthly_income.unwrap_or(Decimal::ZERO);
    let dti = if income > Decimal::ZERO {
        payment
            .checked_div(income)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or_else(|| DebtAdvisorError::InvalidInput {
                field: "monthly_income".into(),
                reason: "Income too small to compute debt-to-income".into(),
            })?
    } else {
        warnings.push("Monthly income not supplied; debt-to-income treated as unknown".into());
        Decimal::ZERO
    };

    Ok(LoanFigures {
        params,
        payment,
        schedule,
        income,
        dti,
        warnings,
    })
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn borrower_profile(input: &AnalysisInput, figures: &LoanFigures) -> BorrowerProfile {
    let expenses = input
        .monthly_expenses
        .filter(|e| *e > Decimal::ZERO)
        .unwrap_or(figures.income * DEFAULT_EXPENSE_SHARE);
    BorrowerProfile {
        loan_amount: to_f64(figures.params.principal()),
        interest_rate: to_f64(figures.params.annual_rate_pct()),
        term_months: f64::from(input.term_months.unwrap_or(figures.schedule.months())),
        monthly_income: to_f64(figures.income),
        monthly_payment: to_f64(figures.payment),
        dti_ratio: to_f64(figures.dti),
        monthly_expenses: to_f64(expenses),
        emergency_months: to_f64(input.emergency_months.unwrap_or(Decimal::ZERO)),
        age: f64::from(input.age.unwrap_or(DEFAULT_AGE)),
        job_stability: to_f64(input.job_stability.unwrap_or(DEFAULT_JOB_STABILITY)),
        payment_history: to_f64(input.payment_history.unwrap_or(DEFAULT_PAYMENT_HISTORY)),
        account_age: f64::from(input.account_age_months.unwrap_or(DEFAULT_ACCOUNT_AGE_MONTHS)),
        current_savings: to_f64(input.current_savings.unwrap_or(Decimal::ZERO)),
    }
}

/// Model input for this borrower, with the same defaults the analysis uses.
pub fn build_features(input: &AnalysisInput) -> DebtAdvisorResult<FeatureVector> {
    let figures = derive_figures(input)?;
    FeatureVector::from_profile(&borrower_profile(input, &figures))
}

fn build_report(
    input: &AnalysisInput,
    figures: LoanFigures,
    prediction: Option<&ExternalPrediction>,
    start: Instant,
) -> ComputationOutput<AnalysisReport> {
    let principal = figures.params.principal();
    let rate = figures.params.annual_rate_pct();
    let monthly_interest = principal * figures.params.monthly_rate();
    let total_interest = figures.schedule.total_interest();
    let payoff_months = figures.schedule.months();
    // Contract term when given, else however long the schedule runs
    let horizon_months = input.term_months.unwrap_or(payoff_months);

    let risk = assess(figures.dti, rate);

    let optimization = suggest_boost(&BoostInput {
        principal,
        monthly_rate: figures.params.monthly_rate(),
        current_payment: figures.payment,
        monthly_income: figures.income,
        term_months: horizon_months,
    });

    let advice = generate_advice(&AdviceInput {
        dti_pct: figures.dti,
        annual_rate_pct: rate,
        monthly_interest,
        total_interest,
        term_months: horizon_months,
        boost: Some(optimization.clone()),
        health_score: prediction.map(|p| p.health_score),
    });

    debug!(
        severity = %risk.severity,
        dti = %figures.dti,
        payoff_months,
        "analysis complete"
    );

    let report = AnalysisReport {
        risk,
        tips: advice.tips,
        actions: advice.actions,
        monthly_payment: figures.payment,
        monthly_interest,
        total_interest,
        dti_ratio: figures.dti,
        payoff_months,
        optimization,
        prediction: prediction.cloned(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Amortization-based debt health analysis",
        &serde_json::json!({
            "principal": principal.to_string(),
            "annual_rate_pct": rate.to_string(),
            "term_months": input.term_months,
            "monthly_payment_supplied": input.monthly_payment.is_some(),
            "monthly_income": figures.income.to_string(),
            "predictor_output": prediction.is_some(),
        }),
        figures.warnings,
        elapsed,
        report,
    )
}

/// Analyze one borrower, merging an already computed prediction if given.
pub fn analyze(
    input: &AnalysisInput,
    prediction: Option<&ExternalPrediction>,
) -> DebtAdvisorResult<ComputationOutput<AnalysisReport>> {
    let start = Instant::now();
    let figures = derive_figures(input)?;
    Ok(build_report(input, figures, prediction, start))
}

/// Runs analyses against an optional, already loaded predictor.
///
/// The predictor is shared read-only; cloning the analyzer is cheap.
#[derive(Clone, Default)]
pub struct Analyzer {
    predictor: Option<Arc<dyn Predictor>>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predictor(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            predictor: Some(predictor),
        }
    }

    pub fn has_predictor(&self) -> bool {
        self.predictor.is_some()
    }

    /// Analyze one borrower. A failing predictor degrades to a report without
    /// prediction fields and a warning.
    pub fn analyze(
        &self,
        input: &AnalysisInput,
    ) -> DebtAdvisorResult<ComputationOutput<AnalysisReport>> {
        let start = Instant::now();
        let mut figures = derive_figures(input)?;

        let Some(predictor) = self.predictor.as_deref() else {
            return Ok(build_report(input, figures, None, start));
        };

        let prediction = FeatureVector::from_profile(&borrower_profile(input, &figures))
            .and_then(|features| ExternalPrediction::from_predictor(predictor, &features));

        match prediction {
            Ok(p) => Ok(build_report(input, figures, Some(&p), start)),
            Err(e) => {
                warn!(predictor = predictor.name(), error = %e, "predictor failed; continuing without it");
                figures
                    .warnings
                    .push(format!("Predictor '{}' unavailable: {e}", predictor.name()));
                Ok(build_report(input, figures, None, start))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::TipKind;
    use crate::predictor::{ClassCodes, PrecomputedPrediction, REGRESSION_OUTPUT_COUNT};
    use crate::risk::Severity;

    fn base_input() -> AnalysisInput {
        AnalysisInput {
            principal: dec!(100_000),
            annual_rate_pct: dec!(18),
            term_months: Some(48),
            monthly_payment: None,
            monthly_income: Some(dec!(20_000)),
            monthly_expenses: None,
            emergency_months: None,
            age: Some(35),
            job_stability: None,
            payment_history: None,
            account_age_months: None,
            current_savings: None,
        }
    }

    fn precomputed(health: f64) -> PrecomputedPrediction {
        let mut regression = vec![50.0; REGRESSION_OUTPUT_COUNT];
        regression[5] = health;
        PrecomputedPrediction {
            regression,
            classes: ClassCodes {
                strategy: 1,
                action: 2,
                urgency: 1,
                support: 0,
                better_than_average: false,
            },
            labels: None,
        }
    }

    struct FailingPredictor;

    impl Predictor for FailingPredictor {
        fn predict(&self, _features: &FeatureVector) -> DebtAdvisorResult<Vec<f64>> {
            Err(DebtAdvisorError::Prediction("model not loaded".into()))
        }

        fn predict_classes(&self, _features: &FeatureVector) -> DebtAdvisorResult<ClassCodes> {
            Err(DebtAdvisorError::Prediction("model not loaded".into()))
        }
    }

    #[test]
    fn test_derived_payment_and_dti() {
        let out = analyze(&base_input(), None).unwrap();
        let r = &out.result;
        assert!((r.monthly_payment - dec!(2937.50)).abs() < dec!(0.01));
        // 2937.5 / 20000 = 14.69%
        assert!((r.dti_ratio - dec!(14.6875)).abs() < dec!(0.001));
        assert_eq!(r.monthly_interest, dec!(1500));
        assert_eq!(r.payoff_months, 48);
        // 18% rate => high tier
        assert_eq!(r.risk.severity, Severity::High);
        assert!(r.prediction.is_none());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_supplied_payment_drives_horizon() {
        let mut input = base_input();
        input.term_months = None;
        input.monthly_payment = Some(dec!(5_000));
        let r = analyze(&input, None).unwrap().result;
        assert_eq!(r.monthly_payment, dec!(5_000));
        assert!(r.payoff_months < 48);
        assert_eq!(r.dti_ratio, dec!(25));
    }

    #[test]
    fn test_contract_term_sets_advice_horizon() {
        let mut input = base_input();
        input.monthly_payment = Some(dec!(5_000));
        let r = analyze(&input, None).unwrap().result;
        assert!(r.payoff_months < 48);
        let horizon = r.tips.iter().find(|t| t.kind == TipKind::Horizon).unwrap();
        assert_eq!(horizon.message, "Debt free in 48 months");
        assert_eq!(r.optimization.contract_term_months, 48);
    }

    #[test]
    fn test_vanishing_income_is_an_error_not_a_panic() {
        let mut input = base_input();
        input.monthly_income = Some(dec!(0.000000000000000000000000001));
        assert!(matches!(
            analyze(&input, None),
            Err(DebtAdvisorError::InvalidInput { ref field, .. }) if field == "monthly_income"
        ));
    }

    #[test]
    fn test_supplied_payment_too_low_propagates() {
        let mut input = base_input();
        input.monthly_payment = Some(dec!(1_000));
        assert!(matches!(
            analyze(&input, None),
            Err(DebtAdvisorError::PaymentTooLow { .. })
        ));
    }

    #[test]
    fn test_missing_income_is_unknown_not_error() {
        let mut input = base_input();
        input.monthly_income = None;
        let out = analyze(&input, None).unwrap();
        assert_eq!(out.result.dti_ratio, Decimal::ZERO);
        assert_eq!(out.result.optimization.extra_payment, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_default_term_warns() {
        let mut input = base_input();
        input.term_months = None;
        let out = analyze(&input, None).unwrap();
        assert_eq!(out.result.payoff_months, DEFAULT_TERM_MONTHS);
        assert!(out.warnings[0].contains("60-month"));
    }

    #[test]
    fn test_negative_income_rejected() {
        let mut input = base_input();
        input.monthly_income = Some(dec!(-1));
        assert!(matches!(
            analyze(&input, None),
            Err(DebtAdvisorError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_prediction_merged_and_health_tip_added() {
        let p = ExternalPrediction::decode(
            &precomputed(85.0).regression,
            &precomputed(85.0).classes,
            &Default::default(),
        )
        .unwrap();
        let r = analyze(&base_input(), Some(&p)).unwrap().result;
        assert_eq!(r.prediction.as_ref().unwrap().health_score, dec!(85));
        let last = r.tips.last().unwrap();
        assert_eq!(last.kind, TipKind::FinancialHealth);
        assert_eq!(last.message, "Financial health is excellent");
        assert!(r.tips.len() <= 5);
    }

    #[test]
    fn test_analyzer_with_predictor() {
        let analyzer = Analyzer::with_predictor(Arc::new(precomputed(45.0)));
        assert!(analyzer.has_predictor());
        let out = analyzer.analyze(&base_input()).unwrap();
        let prediction = out.result.prediction.unwrap();
        assert_eq!(prediction.payoff_strategy, "Avalanche");
        assert_eq!(prediction.urgency_level, "Watch");
    }

    #[test]
    fn test_analyzer_degrades_when_predictor_fails() {
        let analyzer = Analyzer::with_predictor(Arc::new(FailingPredictor));
        let out = analyzer.analyze(&base_input()).unwrap();
        assert!(out.result.prediction.is_none());
        assert!(out.warnings.iter().any(|w| w.contains("model not loaded")));
    }

    #[test]
    fn test_build_features_applies_defaults() {
        let fv = build_features(&base_input()).unwrap();
        assert_eq!(fv.estimated_expenses, 10_000.0);
        assert_eq!(fv.job_stability, 70.0);
        assert_eq!(fv.account_age, 36.0);
        assert_eq!(fv.age, 35.0);
        assert_eq!(fv.term_months, 48.0);
    }
}
