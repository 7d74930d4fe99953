pub mod card_payoff;
pub mod installment;
