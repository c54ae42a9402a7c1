use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::BillingError;
use super::store::CounterRepository;

/// Minimum width of the counter part of an invoice number.
pub const COUNTER_WIDTH: usize = 4;

/// Scope of one invoice counter: a prefix within a period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceKey {
    pub prefix: String,
    pub period: String,
}

impl SequenceKey {
    pub fn new(prefix: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            period: period.into(),
        }
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.period)
    }
}

/// Format `<prefix>-<period>-<counter>` with the counter zero-padded to
/// four digits, e.g. "PC-2025-0001".
pub fn format_invoice_number(key: &SequenceKey, counter: u32) -> String {
    format!(
        "{}-{}-{:0>width$}",
        key.prefix,
        key.period,
        counter,
        width = COUNTER_WIDTH
    )
}

/// Gapless invoice number allocator.
///
/// Each call advances the stored counter for the prefix+period with a
/// compare-and-set against the [`CounterRepository`], retrying on conflict
/// up to `max_attempts` times. A number is never reused or skipped; when
/// the retry budget runs out the call fails with
/// [`BillingError::SequenceConflict`].
pub struct InvoiceSequencer<'a, C: CounterRepository + ?Sized> {
    counters: &'a C,
    max_attempts: u32,
}

impl<'a, C: CounterRepository + ?Sized> InvoiceSequencer<'a, C> {
    pub fn new(counters: &'a C) -> Self {
        Self {
            counters,
            max_attempts: 8,
        }
    }

    /// Set the compare-and-set retry budget (at least 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Allocate the next invoice number for `prefix` in `period`.
    pub fn next(&self, prefix: &str, period: &str) -> Result<String, BillingError> {
        let key = SequenceKey::new(prefix, period);
        let counter = self.next_counter(&key)?;
        Ok(format_invoice_number(&key, counter))
    }

    /// Allocate the next raw counter for `key`.
    pub fn next_counter(&self, key: &SequenceKey) -> Result<u32, BillingError> {
        for attempt in 1..=self.max_attempts {
            let current = self.counters.current(key)?;
            let next = current.checked_add(1).ok_or_else(|| {
                BillingError::Configuration(format!("invoice counter for {key} is exhausted"))
            })?;
            if self.counters.compare_and_set(key, current, next)? {
                return Ok(next);
            }
            debug!(key = %key, attempt, "invoice counter moved, retrying");
        }
        Err(BillingError::SequenceConflict {
            key: key.to_string(),
            attempts: self.max_attempts,
        })
    }

    /// Preview the next number without consuming it.
    pub fn peek(&self, prefix: &str, period: &str) -> Result<String, BillingError> {
        let key = SequenceKey::new(prefix, period);
        let current = self.counters.current(&key)?;
        Ok(format_invoice_number(&key, current.saturating_add(1)))
    }
}
