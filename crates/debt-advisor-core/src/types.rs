use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DebtAdvisorError;
use crate::DebtAdvisorResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Monthly rates expressed as decimals (0.015 = 1.5% per month).
pub type Rate = Decimal;

/// Percentages as entered by users (18 = 18%).
pub type Percent = Decimal;

/// Hard cap on simulated months (50 years).
pub const MAX_TERM_MONTHS: u32 = 600;

/// Largest accepted principal or balance (one trillion).
pub const MAX_PRINCIPAL: Decimal = dec!(1_000_000_000_000);

/// Largest accepted annual interest rate, in percent.
pub const MAX_ANNUAL_RATE_PCT: Decimal = dec!(100);

/// Convert an annual percentage rate into a monthly decimal rate.
/// Negative rates are treated as zero.
pub fn monthly_rate(annual_rate_pct: Percent) -> Rate {
    if annual_rate_pct <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        annual_rate_pct / dec!(100) / dec!(12)
    }
}

/// Validated loan parameters: a principal, an annual rate and either a term
/// or a fixed monthly payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanParameters {
    principal: Money,
    annual_rate_pct: Percent,
    repayment: Repayment,
}

/// How the loan is repaid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repayment {
    Term(u32),
    FixedPayment(Money),
}

impl LoanParameters {
    pub fn new(
        principal: Money,
        annual_rate_pct: Percent,
        repayment: Repayment,
    ) -> DebtAdvisorResult<Self> {
        validate_principal(principal)?;
        validate_rate(annual_rate_pct)?;
        match repayment {
            Repayment::Term(months) => validate_term(i64::from(months))?,
            Repayment::FixedPayment(payment) => validate_positive("monthly_payment", payment)?,
        }
        Ok(Self {
            principal,
            annual_rate_pct,
            repayment,
        })
    }

    /// Build parameters from raw floats, rejecting NaN and infinities before
    /// any arithmetic happens.
    pub fn try_from_f64(
        principal: f64,
        annual_rate_pct: f64,
        term_months: Option<u32>,
        monthly_payment: Option<f64>,
    ) -> DebtAdvisorResult<Self> {
        let principal = decimal_from_f64("principal", principal)?;
        let annual_rate_pct = decimal_from_f64("annual_rate_pct", annual_rate_pct)?;
        let repayment = match (term_months, monthly_payment) {
            (_, Some(payment)) => {
                Repayment::FixedPayment(decimal_from_f64("monthly_payment", payment)?)
            }
            (Some(term), None) => Repayment::Term(term),
            (None, None) => {
                return Err(DebtAdvisorError::InvalidInput {
                    field: "term_months".into(),
                    reason: "Either a term or a monthly payment is required".into(),
                })
            }
        };
        Self::new(principal, annual_rate_pct, repayment)
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate_pct(&self) -> Percent {
        self.annual_rate_pct
    }

    pub fn repayment(&self) -> Repayment {
        self.repayment
    }

    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.annual_rate_pct)
    }
}

/// Convert a float into a Decimal, rejecting NaN and infinities.
pub fn decimal_from_f64(field: &str, value: f64) -> DebtAdvisorResult<Decimal> {
    if !value.is_finite() {
        return Err(DebtAdvisorError::InvalidInput {
            field: field.into(),
            reason: "Value must be a finite number".into(),
        });
    }
    Decimal::try_from(value).map_err(|e| DebtAdvisorError::InvalidInput {
        field: field.into(),
        reason: e.to_string(),
    })
}

pub(crate) fn validate_principal(principal: Money) -> DebtAdvisorResult<()> {
    if principal <= Decimal::ZERO {
        return Err(DebtAdvisorError::InvalidPrincipal(principal));
    }
    if principal > MAX_PRINCIPAL {
        return Err(DebtAdvisorError::InvalidInput {
            field: "principal".into(),
            reason: "Principal cannot exceed 1 trillion".into(),
        });
    }
    Ok(())
}

pub(crate) fn validate_rate(annual_rate_pct: Percent) -> DebtAdvisorResult<()> {
    if annual_rate_pct < Decimal::ZERO || annual_rate_pct > MAX_ANNUAL_RATE_PCT {
        return Err(DebtAdvisorError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Interest rate must be between 0% and 100%".into(),
        });
    }
    Ok(())
}

pub(crate) fn validate_term(term_months: i64) -> DebtAdvisorResult<()> {
    if term_months <= 0 {
        return Err(DebtAdvisorError::InvalidTerm(term_months));
    }
    if term_months > i64::from(MAX_TERM_MONTHS) {
        return Err(DebtAdvisorError::InvalidInput {
            field: "term_months".into(),
            reason: "Term cannot exceed 600 months (50 years)".into(),
        });
    }
    Ok(())
}

pub(crate) fn validate_positive(field: &str, value: Money) -> DebtAdvisorResult<()> {
    if value <= Decimal::ZERO {
        return Err(DebtAdvisorError::InvalidInput {
            field: field.into(),
            reason: "Must be positive".into(),
        });
    }
    Ok(())
}

pub(crate) fn validate_non_negative(field: &str, value: Money) -> DebtAdvisorResult<()> {
    if value < Decimal::ZERO {
        return Err(DebtAdvisorError::InvalidInput {
            field: field.into(),
            reason: "Cannot be negative".into(),
        });
    }
    Ok(())
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
