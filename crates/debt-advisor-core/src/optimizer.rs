//! Smart payment boost.
//!
//! Suggests an extra monthly payment that keeps total debt service within
//! 40% of income while leaving at least 40% of income for living costs, then
//! measures the months and interest it saves against the current payment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amortization::schedule::simulate_at_monthly_rate;
use crate::types::{Money, Rate, MAX_TERM_MONTHS};

/// Share of income that total debt payments may reach.
const MAX_DEBT_SERVICE_SHARE: Decimal = dec!(0.4);
/// Share of income kept back for living expenses.
const MIN_LIVING_SHARE: Decimal = dec!(0.4);
/// Suggestions are whole multiples of this amount.
const BOOST_STEP: Decimal = dec!(100);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostInput {
    pub principal: Money,
    /// Monthly rate as a decimal (0.015 = 1.5%).
    pub monthly_rate: Rate,
    pub current_payment: Money,
    pub monthly_income: Money,
    /// Contractual term, carried through for comparison.
    pub term_months: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    /// Extra monthly payment, a multiple of 100
    pub extra_payment: Money,
    pub months_saved: u32,
    pub money_saved: Money,
    /// Payoff months at the current payment (0 when not simulated)
    pub baseline_months: u32,
    /// Payoff months with the boost applied (0 when not simulated)
    pub boosted_months: u32,
    pub contract_term_months: u32,
}

impl OptimizationSuggestion {
    fn none(term_months: u32) -> Self {
        Self {
            contract_term_months: term_months,
            ..Self::default()
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.extra_payment > Decimal::ZERO && self.months_saved > 0
    }
}

/// Largest affordable boost, rounded down to the nearest 100.
pub fn affordable_boost(current_payment: Money, monthly_income: Money) -> Money {
    let ceiling = monthly_income * MAX_DEBT_SERVICE_SHARE - current_payment;
    let available = monthly_income - current_payment - monthly_income * MIN_LIVING_SHARE;
    let boost = ceiling.max(Decimal::ZERO).min(available);
    if boost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (boost / BOOST_STEP).floor() * BOOST_STEP
}

/// Suggest an extra monthly payment and what it saves.
///
/// Returns a zero suggestion when there is no headroom, no interest to save,
/// or the current payment never retires the debt.
pub fn suggest_boost(input: &BoostInput) -> OptimizationSuggestion {
    let term = input.term_months;
    if input.monthly_income <= Decimal::ZERO
        || input.current_payment <= Decimal::ZERO
        || input.principal <= Decimal::ZERO
    {
        return OptimizationSuggestion::none(term);
    }

    let boost = affordable_boost(input.current_payment, input.monthly_income);
    if boost <= Decimal::ZERO || input.monthly_rate <= Decimal::ZERO {
        return OptimizationSuggestion::none(term);
    }

    let baseline = match simulate_at_monthly_rate(
        input.principal,
        input.monthly_rate,
        input.current_payment,
        MAX_TERM_MONTHS,
    ) {
        Ok(schedule) => schedule,
        Err(e) => {
            debug!(error = %e, "baseline payoff does not converge; no boost suggested");
            return OptimizationSuggestion::none(term);
        }
    };

    // A larger payment than a converging baseline always converges sooner
    let Some(boosted_payment) = input.current_payment.checked_add(boost) else {
        return OptimizationSuggestion::none(term);
    };
    let boosted = match simulate_at_monthly_rate(
        input.principal,
        input.monthly_rate,
        boosted_payment,
        MAX_TERM_MONTHS,
    ) {
        Ok(schedule) => schedule,
        Err(_) => return OptimizationSuggestion::none(term),
    };

    let money_saved = (baseline.total_interest() - boosted.total_interest()).max(Decimal::ZERO);
    let months_saved = baseline.months().saturating_sub(boosted.months());

    OptimizationSuggestion {
        extra_payment: boost,
        months_saved,
        money_saved,
        baseline_months: baseline.months(),
        boosted_months: boosted.months(),
        contract_term_months: term,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> BoostInput {
        BoostInput {
            principal: dec!(100_000),
            monthly_rate: dec!(0.015),
            current_payment: dec!(2_937.50),
            monthly_income: dec!(20_000),
            term_months: 48,
        }
    }

    #[test]
    fn test_affordable_boost_rounds_down() {
        // ceiling = 8000 - 2937.5 = 5062.5; available = 20000 - 2937.5 - 8000 = 9062.5
        assert_eq!(affordable_boost(dec!(2_937.50), dec!(20_000)), dec!(5000));
        // ceiling = 4000 - 3950 = 50 -> rounds down to 0
        assert_eq!(affordable_boost(dec!(3_950), dec!(10_000)), Decimal::ZERO);
    }

    #[test]
    fn test_affordable_boost_no_headroom() {
        // Payment already above 40% of income
        assert_eq!(affordable_boost(dec!(5_000), dec!(10_000)), Decimal::ZERO);
    }

    #[test]
    fn test_boost_saves_time_and_interest() {
        let s = suggest_boost(&base_input());
        assert_eq!(s.extra_payment, dec!(5000));
        assert!(s.months_saved > 0);
        assert!(s.money_saved > Decimal::ZERO);
        assert_eq!(s.baseline_months, 48);
        assert_eq!(s.baseline_months - s.boosted_months, s.months_saved);
        assert_eq!(s.contract_term_months, 48);
        assert!(s.is_actionable());
    }

    #[test]
    fn test_zero_rate_returns_zero_suggestion() {
        let mut input = base_input();
        input.monthly_rate = Decimal::ZERO;
        input.monthly_income = dec!(30_000);
        input.current_payment = dec!(5_000);
        let s = suggest_boost(&input);
        assert_eq!(s.extra_payment, Decimal::ZERO);
        assert_eq!(s.months_saved, 0);
        assert_eq!(s.money_saved, Decimal::ZERO);
        assert!(!s.is_actionable());
    }

    #[test]
    fn test_non_converging_baseline_returns_zero_suggestion() {
        let mut input = base_input();
        // 1.5% of 100k = 1500 interest; paying 1000 never retires the debt
        input.current_payment = dec!(1_000);
        let s = suggest_boost(&input);
        assert_eq!(s, OptimizationSuggestion::none(48));
    }

    #[test]
    fn test_missing_income_returns_zero_suggestion() {
        let mut input = base_input();
        input.monthly_income = Decimal::ZERO;
        assert_eq!(suggest_boost(&input).extra_payment, Decimal::ZERO);
    }
}
