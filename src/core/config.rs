use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::BillingError;
use super::states::FALLBACK_STATE_CODE;

/// Numbering epoch after which the invoice counter restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodScheme {
    /// January–December, rendered `"2025"`.
    #[default]
    CalendarYear,
    /// Indian financial year April–March, rendered `"2025-26"`.
    FinancialYear,
}

impl PeriodScheme {
    /// Period label for a date.
    pub fn period_for(&self, date: NaiveDate) -> String {
        match self {
            Self::CalendarYear => date.year().to_string(),
            Self::FinancialYear => {
                let start = if date.month() >= 4 {
                    date.year()
                } else {
                    date.year() - 1
                };
                format!("{start}-{:02}", (start + 1).rem_euclid(100))
            }
        }
    }
}

/// What to do when input data cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Use the documented fallback, log it, and flag it for review.
    #[default]
    Absorb,
    /// Fail the invoice generation.
    Reject,
}

/// Per-concern fallback behaviour for data-quality problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPolicy {
    /// Unknown buyer state name.
    pub jurisdiction: FallbackMode,
    /// Line item without an item or category rate.
    pub tax_rate: FallbackMode,
}

impl FallbackPolicy {
    /// Reject every unresolved input.
    pub fn strict() -> Self {
        Self {
            jurisdiction: FallbackMode::Reject,
            tax_rate: FallbackMode::Reject,
        }
    }
}

/// Runtime configuration of the invoicing core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub period: PeriodScheme,
    pub fallback: FallbackPolicy,
    /// State code used for unknown buyer states.
    pub fallback_jurisdiction_code: String,
    /// Compare-and-set attempts before a sequence conflict is reported.
    pub sequence_max_attempts: u32,
    /// Offset from UTC, in minutes, of the seller's local time. Decides
    /// which period an invoice issued around midnight belongs to.
    pub utc_offset_minutes: i32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            period: PeriodScheme::CalendarYear,
            fallback: FallbackPolicy::default(),
            fallback_jurisdiction_code: FALLBACK_STATE_CODE.into(),
            sequence_max_attempts: 8,
            utc_offset_minutes: IST_OFFSET_MINUTES,
        }
    }
}

/// Indian Standard Time, UTC+05:30.
pub const IST_OFFSET_MINUTES: i32 = 330;

impl BillingConfig {
    /// Load configuration from JSON. Missing fields take their defaults.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, BillingError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BillingError::Serialization(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Period label for an issue timestamp, in the seller's local time.
    pub fn period_at(&self, at: DateTime<Utc>) -> Result<String, BillingError> {
        let offset = FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            BillingError::Configuration(format!(
                "utc_offset_minutes {} is out of range",
                self.utc_offset_minutes
            ))
        })?;
        Ok(self
            .period
            .period_for(at.with_timezone(&offset).date_naive()))
    }

    /// Reject configurations that cannot work.
    pub fn check(&self) -> Result<(), BillingError> {
        if self.sequence_max_attempts == 0 {
            return Err(BillingError::Configuration(
                "sequence_max_attempts must be at least 1".into(),
            ));
        }
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(BillingError::Configuration(format!(
                "utc_offset_minutes {} is out of range",
                self.utc_offset_minutes
            )));
        }
        let code = &self.fallback_jurisdiction_code;
        if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BillingError::Configuration(format!(
                "fallback_jurisdiction_code '{code}' must be a two-digit state code"
            )));
        }
        Ok(())
    }
}

/// Builder for [`BillingConfig`].
///
/// ```
/// use gstbill::core::{BillingConfigBuilder, FallbackPolicy, PeriodScheme};
///
/// let config = BillingConfigBuilder::new()
///     .period(PeriodScheme::FinancialYear)
///     .fallback(FallbackPolicy::strict())
///     .build()
///     .unwrap();
/// assert_eq!(config.sequence_max_attempts, 8);
/// ```
#[derive(Default)]
pub struct BillingConfigBuilder {
    config: BillingConfig,
}

impl BillingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(mut self, period: PeriodScheme) -> Self {
        self.config.period = period;
        self
    }

    pub fn fallback(mut self, policy: FallbackPolicy) -> Self {
        self.config.fallback = policy;
        self
    }

    pub fn fallback_jurisdiction_code(mut self, code: impl Into<String>) -> Self {
        self.config.fallback_jurisdiction_code = code.into();
        self
    }

    pub fn sequence_max_attempts(mut self, attempts: u32) -> Self {
        self.config.sequence_max_attempts = attempts;
        self
    }

    pub fn utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.config.utc_offset_minutes = minutes;
        self
    }

    pub fn build(self) -> Result<BillingConfig, BillingError> {
        self.config.check()?;
        Ok(self.config)
    }
}
