//! Storage seams consumed by the invoicing core.
//!
//! Implementations must provide their guarantees at the storage layer, not
//! through in-process locks alone: `compare_and_set` and `insert_invoice`
//! have to be atomic across every service instance sharing the store.

use super::error::BillingError;
use super::numbering::SequenceKey;
use super::types::{Invoice, Order, TaxClass, TaxSettings};

/// Read access to orders plus the single invoice back-reference write.
pub trait OrderRepository: Send + Sync {
    fn order(&self, order_id: &str) -> Result<Option<Order>, BillingError>;

    /// Record the issued invoice number on the order.
    fn set_invoice_number(&self, order_id: &str, invoice_number: &str)
    -> Result<(), BillingError>;
}

/// Outcome of [`InvoiceRepository::insert_invoice`].
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted,
    /// Another invoice for the same order was stored first.
    AlreadyExists(Box<Invoice>),
}

pub trait InvoiceRepository: Send + Sync {
    fn invoice_for_order(&self, order_id: &str) -> Result<Option<Invoice>, BillingError>;

    fn invoice_by_number(&self, invoice_number: &str) -> Result<Option<Invoice>, BillingError>;

    /// Insert if no invoice exists for `invoice.order_id`.
    fn insert_invoice(&self, invoice: Invoice) -> Result<InsertOutcome, BillingError>;

    /// Newest first, ties broken by invoice number descending.
    fn list_invoices(&self, offset: usize, limit: usize) -> Result<Vec<Invoice>, BillingError>;
}

pub trait SettingsRepository: Send + Sync {
    /// `None` if settings were never saved.
    fn tax_settings(&self) -> Result<Option<TaxSettings>, BillingError>;
}

/// Persistent per-prefix, per-period invoice counters.
pub trait CounterRepository: Send + Sync {
    /// Highest counter issued for `key`, `0` if none.
    fn current(&self, key: &SequenceKey) -> Result<u32, BillingError>;

    /// Atomically set the counter to `new` if it still equals `expected`.
    /// Returns `false` when another writer got there first.
    fn compare_and_set(
        &self,
        key: &SequenceKey,
        expected: u32,
        new: u32,
    ) -> Result<bool, BillingError>;
}

/// Product and category tax lookup. Absence is a valid answer.
pub trait TaxCatalog: Send + Sync {
    fn product_tax(&self, product_id: &str) -> Option<TaxClass>;

    fn category_tax(&self, category_id: &str) -> Option<TaxClass>;
}

/// A catalog that knows nothing; every line falls through to the
/// order snapshot and the global default.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl TaxCatalog for EmptyCatalog {
    fn product_tax(&self, _product_id: &str) -> Option<TaxClass> {
        None
    }

    fn category_tax(&self, _category_id: &str) -> Option<TaxClass> {
        None
    }
}

/// Everything the invoice assembler needs from a backing store.
pub trait BillingStore:
    OrderRepository + InvoiceRepository + SettingsRepository + CounterRepository + TaxCatalog
{
}

impl<T> BillingStore for T where
    T: OrderRepository + InvoiceRepository + SettingsRepository + CounterRepository + TaxCatalog
{
}
