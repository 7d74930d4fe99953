//! Tiered advice.
//!
//! Three independent rule ladders (debt-to-income, interest rate, payoff
//! horizon) each contribute at most one tip, picked by the first matching
//! band from most to least severe. Boost and financial-health commentary
//! follow when available.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::optimizer::OptimizationSuggestion;
use crate::types::{Money, Percent};

pub const MAX_TIPS: usize = 5;
pub const MAX_ACTIONS: usize = 3;

/// Which dimension of the analysis a tip comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipKind {
    DebtToIncome,
    InterestRate,
    Horizon,
    PaymentBoost,
    FinancialHealth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub kind: TipKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceInput {
    pub dti_pct: Percent,
    pub annual_rate_pct: Percent,
    pub monthly_interest: Money,
    pub total_interest: Money,
    pub term_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<OptimizationSuggestion>,
    /// 0-100, from the external predictor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_score: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub tips: Vec<Tip>,
    pub actions: Vec<String>,
}

impl Advice {
    fn tip(&mut self, kind: TipKind, message: String) {
        self.tips.push(Tip { kind, message });
    }

    fn action(&mut self, message: &str) {
        self.actions.push(message.to_string());
    }
}

/// Build tips (max 5) and actions (max 3) in generation order.
pub fn generate_advice(input: &AdviceInput) -> Advice {
    let mut advice = Advice::default();

    debt_to_income_advice(&mut advice, input.dti_pct);
    interest_rate_advice(&mut advice, input.annual_rate_pct, input.monthly_interest);
    horizon_advice(&mut advice, input.term_months, input.total_interest);

    if let Some(boost) = input.boost.as_ref().filter(|b| b.is_actionable()) {
        advice.tip(
            TipKind::PaymentBoost,
            format!(
                "Paying {:.0} more per month clears the debt {} months sooner and saves {:.0} in interest",
                boost.extra_payment, boost.months_saved, boost.money_saved
            ),
        );
    }

    if let Some(score) = input.health_score {
        advice.tip(TipKind::FinancialHealth, health_commentary(score).to_string());
    }

    advice.tips.truncate(MAX_TIPS);
    advice.actions.truncate(MAX_ACTIONS);
    advice
}

fn debt_to_income_advice(advice: &mut Advice, dti: Percent) {
    if dti > dec!(50) {
        advice.tip(
            TipKind::DebtToIncome,
            format!("Debt payments take {dti:.0}% of income, a critical level (aim for under 30%)"),
        );
        advice.action("Cut non-essential spending now and look for ways to raise income");
    } else if dti > dec!(40) {
        advice.tip(
            TipKind::DebtToIncome,
            format!("Debt payments of {dti:.0}% of income are a heavy load"),
        );
        advice.action("Trim discretionary spending and put the difference toward repayments");
    } else if dti > dec!(30) {
        advice.tip(
            TipKind::DebtToIncome,
            format!("Debt payments of {dti:.0}% of income are manageable"),
        );
        advice.action("Build an emergency fund alongside your repayments");
    } else if dti > Decimal::ZERO {
        advice.tip(
            TipKind::DebtToIncome,
            format!("Debt payments of {dti:.0}% of income are in a healthy range"),
        );
    }
}

fn interest_rate_advice(advice: &mut Advice, rate: Percent, monthly_interest: Money) {
    let shown = rate.normalize();
    if rate >= dec!(20) {
        advice.tip(
            TipKind::InterestRate,
            format!("An interest rate of {shown}% is very high (about {monthly_interest:.0} per month)"),
        );
        advice.action("Pay this debt down before any other");
    } else if rate >= dec!(15) {
        advice.tip(
            TipKind::InterestRate,
            format!("An interest rate of {shown}% is at credit-card levels"),
        );
        advice.action("Stop new card spending and focus on clearing the balance");
    } else if rate >= dec!(8) {
        advice.tip(
            TipKind::InterestRate,
            format!("An interest rate of {shown}% is moderate"),
        );
    } else if rate >= dec!(2) {
        advice.tip(TipKind::InterestRate, format!("An interest rate of {shown}% is low"));
    } else {
        advice.tip(
            TipKind::InterestRate,
            format!("An interest rate of {shown}% is very low"),
        );
    }
}

fn horizon_advice(advice: &mut Advice, term_months: u32, total_interest: Money) {
    let years = Decimal::from(term_months) / dec!(12);
    if years > dec!(10) {
        advice.tip(
            TipKind::Horizon,
            format!("Repaying over {years:.1} years costs {total_interest:.0} in total interest"),
        );
        advice.action("Add a little extra to every payment; over this horizon it saves a lot");
    } else if years > dec!(5) {
        advice.tip(
            TipKind::Horizon,
            format!("Repaying over {years:.1} years ({term_months} months)"),
        );
    } else if years > Decimal::ZERO {
        advice.tip(
            TipKind::Horizon,
            format!("Debt free in {term_months} months"),
        );
    }
}

fn health_commentary(score: Decimal) -> &'static str {
    if score >= dec!(80) {
        "Financial health is excellent"
    } else if score >= dec!(60) {
        "Financial health is fair"
    } else if score >= dec!(40) {
        "Financial health needs attention"
    } else {
        "Financial health is a concern"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> AdviceInput {
        AdviceInput {
            dti_pct: dec!(25),
            annual_rate_pct: dec!(5),
            monthly_interest: dec!(100),
            total_interest: dec!(3_000),
            term_months: 36,
            boost: None,
            health_score: None,
        }
    }

    fn kinds(advice: &Advice) -> Vec<TipKind> {
        advice.tips.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_low_risk_profile_has_no_actions() {
        let advice = generate_advice(&base_input());
        assert_eq!(
            kinds(&advice),
            vec![TipKind::DebtToIncome, TipKind::InterestRate, TipKind::Horizon]
        );
        assert!(advice.actions.is_empty());
        assert!(advice.tips[0].message.contains("25%"));
        assert!(advice.tips[2].message.contains("36 months"));
    }

    #[test]
    fn test_critical_profile_emits_actions_in_order() {
        let mut input = base_input();
        input.dti_pct = dec!(62);
        input.annual_rate_pct = dec!(24);
        input.term_months = 180;
        let advice = generate_advice(&input);
        assert_eq!(advice.actions.len(), 3);
        assert!(advice.actions[0].starts_with("Cut non-essential"));
        assert!(advice.actions[1].starts_with("Pay this debt down"));
        assert!(advice.actions[2].starts_with("Add a little extra"));
        assert!(advice.tips[1].message.contains("about 100 per month"));
        assert!(advice.tips[2].message.contains("15.0 years"));
    }

    #[test]
    fn test_zero_dti_skips_dti_tip() {
        let mut input = base_input();
        input.dti_pct = Decimal::ZERO;
        let advice = generate_advice(&input);
        assert_eq!(kinds(&advice), vec![TipKind::InterestRate, TipKind::Horizon]);
    }

    #[test]
    fn test_rate_bands() {
        let msg = |rate: Decimal| {
            let mut input = base_input();
            input.annual_rate_pct = rate;
            generate_advice(&input).tips[1].message.clone()
        };
        assert!(msg(dec!(15)).contains("credit-card"));
        assert!(msg(dec!(8)).ends_with("moderate"));
        assert!(msg(dec!(2)).ends_with("is low"));
        assert!(msg(dec!(1.5)).ends_with("very low"));
    }

    #[test]
    fn test_tip_and_action_caps() {
        let mut input = base_input();
        input.dti_pct = dec!(45);
        input.annual_rate_pct = dec!(16);
        input.term_months = 240;
        input.boost = Some(OptimizationSuggestion {
            extra_payment: dec!(500),
            months_saved: 40,
            money_saved: dec!(12_345),
            baseline_months: 240,
            boosted_months: 200,
            contract_term_months: 240,
        });
        input.health_score = Some(dec!(35));
        let advice = generate_advice(&input);
        assert_eq!(advice.tips.len(), MAX_TIPS);
        assert_eq!(advice.actions.len(), MAX_ACTIONS);
        assert_eq!(advice.tips[3].kind, TipKind::PaymentBoost);
        assert!(advice.tips[3].message.contains("40 months sooner"));
        assert_eq!(advice.tips[4].message, "Financial health is a concern");
    }

    #[test]
    fn test_unactionable_boost_is_silent() {
        let mut input = base_input();
        input.boost = Some(OptimizationSuggestion::default());
        assert!(!kinds(&generate_advice(&input)).contains(&TipKind::PaymentBoost));
    }

    #[test]
    fn test_health_bands() {
        assert_eq!(health_commentary(dec!(80)), "Financial health is excellent");
        assert_eq!(health_commentary(dec!(60)), "Financial health is fair");
        assert_eq!(health_commentary(dec!(40)), "Financial health needs attention");
        assert_eq!(health_commentary(dec!(39.9)), "Financial health is a concern");
    }
}
