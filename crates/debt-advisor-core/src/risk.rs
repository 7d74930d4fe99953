//! Debt risk classification.
//!
//! Maps debt-to-income ratio and annual interest rate onto an ordered
//! severity tier and a 0-99 risk score. Tiers are checked from most to least
//! severe; the first match wins.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Percent;

/// Ordered severity tier: low < medium < high < critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub severity: Severity,
    /// 0-99
    pub risk_score: Decimal,
}

/// Classify a debt by its DTI ratio and annual rate (both in percent).
pub fn assess(dti_pct: Percent, annual_rate_pct: Percent) -> RiskAssessment {
    let dti = dti_pct;
    let rate = annual_rate_pct;

    let (severity, risk_score) = if dti > dec!(50) || rate >= dec!(20) {
        let score = dec!(75) + floored((dti - dec!(50)) / dec!(2)).max(floored(rate - dec!(20)));
        (Severity::Critical, score.min(dec!(99)))
    } else if dti > dec!(40) || rate >= dec!(15) {
        let score = dec!(55) + floored(dti - dec!(40)).max(floored((rate - dec!(15)) * dec!(2)));
        (Severity::High, score.min(dec!(85)))
    } else if dti > dec!(30) || rate >= dec!(10) {
        let score = dec!(35) + floored(dti - dec!(30)).max(floored((rate - dec!(10)) * dec!(2)));
        (Severity::Medium, score.min(dec!(65)))
    } else {
        let score = dec!(30) - (dec!(30) - dti) / dec!(2);
        (Severity::Low, score.max(dec!(10)))
    };

    RiskAssessment {
        severity,
        risk_score,
    }
}

/// Factors that did not trigger the tier contribute nothing.
fn floored(term: Decimal) -> Decimal {
    term.max(Decimal::ZERO)
}
