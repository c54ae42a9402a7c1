use thiserror::Error;

/// Errors that can occur during tax computation or invoice generation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BillingError {
    /// The order has not reached a state that allows invoicing.
    #[error("order {order_id} is not yet eligible for an invoice: {reason}")]
    NotEligible { order_id: String, reason: String },

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(String),

    /// A jurisdiction name could not be matched and the fallback is disabled.
    #[error("unresolved jurisdiction: '{0}'")]
    UnresolvedJurisdiction(String),

    /// No tax rate could be determined for a line.
    #[error("unresolved tax rate: {0}")]
    UnresolvedTaxRate(String),

    /// The invoice counter could not be advanced within the retry budget.
    #[error("invoice sequence conflict on {key} after {attempts} attempts")]
    SequenceConflict { key: String, attempts: u32 },

    /// Amount passed to the words converter is negative or over-precise.
    #[error("malformed amount: {0}")]
    MalformedAmount(String),

    /// Tax settings or billing configuration are invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Backing store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// JSON encoding or decoding error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl BillingError {
    /// Collapse a list of validation errors into a single `Validation` error.
    pub fn from_validation(errors: &[ValidationError]) -> Self {
        let msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation(msg)
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "settings.invoice_prefix").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Rule identifier if applicable (e.g. "SUM-01").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
