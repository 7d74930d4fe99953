//! External financial-health predictor contract.
//!
//! The model is trained offline and loaded by the caller. This module owns
//! the typed feature vector handed to it, the trait it must implement, and
//! the decoding of its raw output into named, clamped fields.
//!
//! The feature order is a versioned contract with the training pipeline:
//! [`FEATURE_NAMES`] and [`FeatureVector::to_array`] must change together.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DebtAdvisorError;
use crate::types::decimal_from_f64;
use crate::DebtAdvisorResult;

pub const FEATURE_COUNT: usize = 30;

/// Column order the model was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "loan_amount",
    "interest_rate",
    "term_months",
    "monthly_income",
    "monthly_payment",
    "dti_ratio",
    "min_payment",
    "estimated_expenses",
    "emergency_months",
    "age",
    "job_stability",
    "payment_history",
    "account_age",
    "current_savings",
    "effective_rate",
    "log_loan",
    "log_income",
    "payment_flexibility",
    "debt_to_annual_income",
    "payment_to_min_ratio",
    "savings_rate",
    "years_to_retirement",
    "is_student_loan",
    "is_personal_loan",
    "is_credit_card",
    "is_high_risk",
    "is_young",
    "is_senior",
    "has_emergency_fund",
    "is_high_income",
];

pub const REGRESSION_OUTPUT_COUNT: usize = 16;

/// Regression output order. The first four are superseded by the
/// deterministic optimizer and are not decoded.
pub const REGRESSION_TARGETS: [&str; REGRESSION_OUTPUT_COUNT] = [
    "debt_freedom_months",
    "smart_payment_boost",
    "time_saved_months",
    "money_saved_total",
    "interest_burden_ratio",
    "financial_health_score",
    "debt_stress_index",
    "financial_stability",
    "wealth_building_potential",
    "emergency_buffer_months",
    "savings_potential",
    "investment_readiness",
    "retirement_gap_years",
    "percentile_rank",
    "credit_score_impact",
    "life_quality_score",
];

/// Raw borrower figures the engineered features are derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerProfile {
    pub loan_amount: f64,
    /// Annual percent
    pub interest_rate: f64,
    pub term_months: f64,
    pub monthly_income: f64,
    pub monthly_payment: f64,
    /// Percent
    pub dti_ratio: f64,
    pub monthly_expenses: f64,
    pub emergency_months: f64,
    pub age: f64,
    pub job_stability: f64,
    pub payment_history: f64,
    pub account_age: f64,
    pub current_savings: f64,
}

/// Model input, one named field per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub term_months: f64,
    pub monthly_income: f64,
    pub monthly_payment: f64,
    pub dti_ratio: f64,
    pub min_payment: f64,
    pub estimated_expenses: f64,
    pub emergency_months: f64,
    pub age: f64,
    pub job_stability: f64,
    pub payment_history: f64,
    pub account_age: f64,
    pub current_savings: f64,
    pub effective_rate: f64,
    pub log_loan: f64,
    pub log_income: f64,
    pub payment_flexibility: f64,
    pub debt_to_annual_income: f64,
    pub payment_to_min_ratio: f64,
    pub savings_rate: f64,
    pub years_to_retirement: f64,
    pub is_student_loan: f64,
    pub is_personal_loan: f64,
    pub is_credit_card: f64,
    pub is_high_risk: f64,
    pub is_young: f64,
    pub is_senior: f64,
    pub has_emergency_fund: f64,
    pub is_high_income: f64,
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

impl FeatureVector {
    pub fn from_profile(p: &BorrowerProfile) -> DebtAdvisorResult<Self> {
        let raw = [
            ("loan_amount", p.loan_amount),
            ("interest_rate", p.interest_rate),
            ("term_months", p.term_months),
            ("monthly_income", p.monthly_income),
            ("monthly_payment", p.monthly_payment),
            ("dti_ratio", p.dti_ratio),
            ("monthly_expenses", p.monthly_expenses),
            ("emergency_months", p.emergency_months),
            ("age", p.age),
            ("job_stability", p.job_stability),
            ("payment_history", p.payment_history),
            ("account_age", p.account_age),
            ("current_savings", p.current_savings),
        ];
        for (field, value) in raw {
            if !value.is_finite() {
                return Err(DebtAdvisorError::InvalidInput {
                    field: field.into(),
                    reason: "Feature must be a finite number".into(),
                });
            }
        }

        let rate = p.interest_rate;
        let income = p.monthly_income;
        let headroom = income - p.monthly_payment - p.monthly_expenses;

        Ok(Self {
            loan_amount: p.loan_amount,
            interest_rate: rate,
            term_months: p.term_months,
            monthly_income: income,
            monthly_payment: p.monthly_payment,
            dti_ratio: p.dti_ratio,
            min_payment: p.monthly_payment,
            estimated_expenses: p.monthly_expenses,
            emergency_months: p.emergency_months,
            age: p.age,
            job_stability: p.job_stability,
            payment_history: p.payment_history,
            account_age: p.account_age,
            current_savings: p.current_savings,
            effective_rate: ((1.0 + rate / 100.0 / 12.0).powi(12) - 1.0) * 100.0,
            log_loan: p.loan_amount.ln_1p(),
            log_income: income.ln_1p(),
            payment_flexibility: headroom,
            debt_to_annual_income: if income > 0.0 {
                p.loan_amount / (income * 12.0)
            } else {
                10.0
            },
            payment_to_min_ratio: 1.0,
            savings_rate: if income > 0.0 {
                headroom / income * 100.0
            } else {
                0.0
            },
            years_to_retirement: (60.0 - p.age).max(0.0),
            is_student_loan: flag(rate <= 2.0),
            is_personal_loan: flag((4.0..15.0).contains(&rate)),
            is_credit_card: flag((15.0..20.0).contains(&rate)),
            is_high_risk: flag(rate >= 20.0),
            is_young: flag(p.age < 30.0),
            is_senior: flag(p.age >= 50.0),
            has_emergency_fund: flag(p.emergency_months >= 3.0),
            is_high_income: flag(income >= 50_000.0),
        })
    }

    /// The single conversion into the model's column order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.loan_amount,
            self.interest_rate,
            self.term_months,
            self.monthly_income,
            self.monthly_payment,
            self.dti_ratio,
            self.min_payment,
            self.estimated_expenses,
            self.emergency_months,
            self.age,
            self.job_stability,
            self.payment_history,
            self.account_age,
            self.current_savings,
            self.effective_rate,
            self.log_loan,
            self.log_income,
            self.payment_flexibility,
            self.debt_to_annual_income,
            self.payment_to_min_ratio,
            self.savings_rate,
            self.years_to_retirement,
            self.is_student_loan,
            self.is_personal_loan,
            self.is_credit_card,
            self.is_high_risk,
            self.is_young,
            self.is_senior,
            self.has_emergency_fund,
            self.is_high_income,
        ]
    }
}

/// Classifier outputs as raw label codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCodes {
    pub strategy: i64,
    pub action: i64,
    pub urgency: i64,
    pub support: i64,
    pub better_than_average: bool,
}

/// Human-readable names for the classifier codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionLabels {
    pub strategy: HashMap<i64, String>,
    pub action: HashMap<i64, String>,
    pub urgency: HashMap<i64, String>,
    pub support: HashMap<i64, String>,
}

fn label_map(labels: &[&str]) -> HashMap<i64, String> {
    labels
        .iter()
        .enumerate()
        .map(|(code, label)| (code as i64, (*label).to_string()))
        .collect()
}

impl Default for PredictionLabels {
    fn default() -> Self {
        Self {
            strategy: label_map(&[
                "Standard",
                "Avalanche",
                "Snowball",
                "Hybrid",
                "Consolidate",
                "Crisis",
            ]),
            action: label_map(&[
                "Maintain",
                "Build reserves",
                "Increase payment",
                "Lower interest",
                "Cut expenses",
                "Increase income",
                "Consult an advisor",
                "Seek urgent help",
            ]),
            urgency: label_map(&["Normal", "Watch", "Urgent", "Very urgent", "Critical"]),
            support: label_map(&[
                "Self-service",
                "Planning tools",
                "Financial education",
                "Financial advisor",
                "Specialist",
                "Emergency",
            ]),
        }
    }
}

impl PredictionLabels {
    fn lookup(map: &HashMap<i64, String>, code: i64, fallback: &str) -> String {
        map.get(&code)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// A pre-trained model bundle. Implementations must be fully loaded before
/// they are shared; calls only read model state.
pub trait Predictor: Send + Sync {
    /// Regression outputs in [`REGRESSION_TARGETS`] order.
    fn predict(&self, features: &FeatureVector) -> DebtAdvisorResult<Vec<f64>>;

    fn predict_classes(&self, features: &FeatureVector) -> DebtAdvisorResult<ClassCodes>;

    fn labels(&self) -> PredictionLabels {
        PredictionLabels::default()
    }

    fn name(&self) -> &str {
        "external"
    }
}

/// Predictor output captured ahead of time, e.g. read from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecomputedPrediction {
    pub regression: Vec<f64>,
    pub classes: ClassCodes,
    #[serde(default)]
    pub labels: Option<PredictionLabels>,
}

impl Predictor for PrecomputedPrediction {
    fn predict(&self, _features: &FeatureVector) -> DebtAdvisorResult<Vec<f64>> {
        Ok(self.regression.clone())
    }

    fn predict_classes(&self, _features: &FeatureVector) -> DebtAdvisorResult<ClassCodes> {
        Ok(self.classes)
    }

    fn labels(&self) -> PredictionLabels {
        self.labels.clone().unwrap_or_default()
    }

    fn name(&self) -> &str {
        "precomputed"
    }
}

/// Decoded predictor output with every field clamped to its documented range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalPrediction {
    pub interest_burden_ratio: Decimal,
    pub health_score: Decimal,
    pub debt_stress_index: Decimal,
    pub stability_score: Decimal,
    pub wealth_potential: Decimal,
    pub emergency_buffer_months: Decimal,
    pub savings_potential: Decimal,
    pub investment_readiness: Decimal,
    pub retirement_gap_years: Decimal,
    pub percentile_rank: Decimal,
    pub credit_score_impact: Decimal,
    pub life_quality_score: Decimal,
    pub payoff_strategy: String,
    pub primary_action: String,
    pub urgency_level: String,
    pub support_needed: String,
    pub better_than_average: bool,
}

fn clamp(value: Decimal, lower: Decimal, upper: Decimal) -> Decimal {
    value.max(lower).min(upper)
}

impl ExternalPrediction {
    pub fn decode(
        regression: &[f64],
        classes: &ClassCodes,
        labels: &PredictionLabels,
    ) -> DebtAdvisorResult<Self> {
        if regression.len() < REGRESSION_OUTPUT_COUNT {
            return Err(DebtAdvisorError::Prediction(format!(
                "Expected {REGRESSION_OUTPUT_COUNT} regression outputs, got {}",
                regression.len()
            )));
        }
        let out = |idx: usize| decimal_from_f64(REGRESSION_TARGETS[idx], regression[idx]);
        let pct = |idx: usize| out(idx).map(|v| clamp(v, Decimal::ZERO, dec!(100)));
        let non_negative = |idx: usize| out(idx).map(|v| v.max(Decimal::ZERO));

        Ok(Self {
            interest_burden_ratio: non_negative(4)?,
            // Whole points, so 79.6 lands in the 80+ band
            health_score: out(5).map(|v| clamp(v.round(), Decimal::ZERO, dec!(100)))?,
            debt_stress_index: pct(6)?,
            stability_score: pct(7)?,
            wealth_potential: pct(8)?,
            emergency_buffer_months: non_negative(9)?,
            savings_potential: non_negative(10)?,
            investment_readiness: pct(11)?,
            retirement_gap_years: non_negative(12)?,
            percentile_rank: clamp(out(13)?, Decimal::ONE, dec!(99)),
            credit_score_impact: clamp(out(14)?, dec!(-50), dec!(50)),
            life_quality_score: pct(15)?,
            payoff_strategy: PredictionLabels::lookup(&labels.strategy, classes.strategy, "Standard"),
            primary_action: PredictionLabels::lookup(&labels.action, classes.action, "Maintain"),
            urgency_level: PredictionLabels::lookup(&labels.urgency, classes.urgency, "Normal"),
            support_needed: PredictionLabels::lookup(&labels.support, classes.support, "Self-service"),
            better_than_average: classes.better_than_average,
        })
    }

    /// Query a predictor and decode its answer.
    pub fn from_predictor(
        predictor: &dyn Predictor,
        features: &FeatureVector,
    ) -> DebtAdvisorResult<Self> {
        let regression = predictor.predict(features)?;
        let classes = predictor.predict_classes(features)?;
        Self::decode(&regression, &classes, &predictor.labels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BorrowerProfile {
        BorrowerProfile {
            loan_amount: 100_000.0,
            interest_rate: 18.0,
            term_months: 48.0,
            monthly_income: 20_000.0,
            monthly_payment: 2_937.5,
            dti_ratio: 14.6875,
            monthly_expenses: 10_000.0,
            emergency_months: 4.0,
            age: 27.0,
            job_stability: 70.0,
            payment_history: 80.0,
            account_age: 36.0,
            current_savings: 15_000.0,
        }
    }

    fn classes() -> ClassCodes {
        ClassCodes {
            strategy: 1,
            action: 2,
            urgency: 0,
            support: 9,
            better_than_average: true,
        }
    }

    #[test]
    fn test_feature_order_matches_names() {
        let fv = FeatureVector::from_profile(&profile()).unwrap();
        let arr = fv.to_array();
        assert_eq!(arr.len(), FEATURE_NAMES.len());
        assert_eq!(arr[0], 100_000.0);
        assert_eq!(arr[FEATURE_NAMES.iter().position(|n| *n == "age").unwrap()], 27.0);
        assert_eq!(arr[6], arr[4], "min_payment mirrors the monthly payment");
        assert_eq!(arr[29], 0.0);
    }

    #[test]
    fn test_engineered_features() {
        let fv = FeatureVector::from_profile(&profile()).unwrap();
        assert!((fv.effective_rate - 19.5618).abs() < 0.001);
        assert_eq!(fv.payment_flexibility, 7_062.5);
        assert!((fv.savings_rate - 35.3125).abs() < 1e-9);
        assert_eq!(fv.years_to_retirement, 33.0);
        assert_eq!(fv.is_credit_card, 1.0);
        assert_eq!(fv.is_personal_loan, 0.0);
        assert_eq!(fv.is_young, 1.0);
        assert_eq!(fv.has_emergency_fund, 1.0);
        assert_eq!(fv.payment_to_min_ratio, 1.0);
    }

    #[test]
    fn test_zero_income_features() {
        let mut p = profile();
        p.monthly_income = 0.0;
        let fv = FeatureVector::from_profile(&p).unwrap();
        assert_eq!(fv.debt_to_annual_income, 10.0);
        assert_eq!(fv.savings_rate, 0.0);
    }

    #[test]
    fn test_non_finite_profile_rejected() {
        let mut p = profile();
        p.age = f64::NAN;
        assert!(FeatureVector::from_profile(&p).is_err());
    }

    #[test]
    fn test_decode_clamps_ranges() {
        let mut reg = vec![0.0; REGRESSION_OUTPUT_COUNT];
        reg[5] = 130.0;
        reg[6] = -4.0;
        reg[13] = 0.2;
        reg[14] = -80.0;
        reg[9] = -2.0;
        let p = ExternalPrediction::decode(&reg, &classes(), &PredictionLabels::default()).unwrap();
        assert_eq!(p.health_score, dec!(100));
        assert_eq!(p.debt_stress_index, Decimal::ZERO);
        assert_eq!(p.percentile_rank, Decimal::ONE);
        assert_eq!(p.credit_score_impact, dec!(-50));
        assert_eq!(p.emergency_buffer_months, Decimal::ZERO);
    }

    #[test]
    fn test_health_score_rounded_to_whole_points() {
        let labels = PredictionLabels::default();
        let mut reg = vec![0.0; REGRESSION_OUTPUT_COUNT];
        reg[5] = 79.6;
        let p = ExternalPrediction::decode(&reg, &classes(), &labels).unwrap();
        assert_eq!(p.health_score, dec!(80));
        reg[5] = 59.4;
        let p = ExternalPrediction::decode(&reg, &classes(), &labels).unwrap();
        assert_eq!(p.health_score, dec!(59));
    }

    #[test]
    fn test_decode_labels_with_fallback() {
        let reg = vec![50.0; REGRESSION_OUTPUT_COUNT];
        let p = ExternalPrediction::decode(&reg, &classes(), &PredictionLabels::default()).unwrap();
        assert_eq!(p.payoff_strategy, "Avalanche");
        assert_eq!(p.primary_action, "Increase payment");
        assert_eq!(p.urgency_level, "Normal");
        // Unknown support code falls back
        assert_eq!(p.support_needed, "Self-service");
        assert!(p.better_than_average);
    }

    #[test]
    fn test_decode_rejects_short_or_nan_output() {
        let labels = PredictionLabels::default();
        assert!(ExternalPrediction::decode(&[1.0; 5], &classes(), &labels).is_err());
        let mut reg = vec![1.0; REGRESSION_OUTPUT_COUNT];
        reg[7] = f64::NAN;
        assert!(ExternalPrediction::decode(&reg, &classes(), &labels).is_err());
    }

    #[test]
    fn test_precomputed_predictor() {
        let pre = PrecomputedPrediction {
            regression: vec![70.0; REGRESSION_OUTPUT_COUNT],
            classes: classes(),
            labels: None,
        };
        let fv = FeatureVector::from_profile(&profile()).unwrap();
        let p = ExternalPrediction::from_predictor(&pre, &fv).unwrap();
        assert_eq!(p.health_score, dec!(70));
        assert_eq!(pre.name(), "precomputed");
    }
}
