pub mod error;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "amortization")]
pub mod loans;

#[cfg(feature = "advisor")]
pub mod risk;

#[cfg(feature = "advisor")]
pub mod advice;

#[cfg(feature = "advisor")]
pub mod optimizer;

#[cfg(feature = "advisor")]
pub mod predictor;

#[cfg(feature = "advisor")]
pub mod analysis;

pub use error::DebtAdvisorError;
pub use types::*;

/// Standard result type for all debt-advisor operations
pub type DebtAdvisorResult<T> = Result<T, DebtAdvisorError>;
