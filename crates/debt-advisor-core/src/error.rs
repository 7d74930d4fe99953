use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DebtAdvisorError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid term: {0} months (must be at least 1)")]
    InvalidTerm(i64),

    #[error("Invalid principal: {0} (must be positive)")]
    InvalidPrincipal(Decimal),

    #[error("Payment too low: {payment} does not exceed first-month interest of {first_interest}")]
    PaymentTooLow {
        payment: Decimal,
        first_interest: Decimal,
    },

    #[error("Non-convergent payoff: balance of {remaining} remains after {months} months")]
    NonConvergent { months: u32, remaining: Decimal },

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DebtAdvisorError {
    fn from(e: serde_json::Error) -> Self {
        DebtAdvisorError::SerializationError(e.to_string())
    }
}
