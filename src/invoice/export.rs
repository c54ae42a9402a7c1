use crate::core::{BillingError, Invoice};

/// Serialize one invoice as pretty-printed JSON.
///
/// Money values are written as strings so no precision is lost.
pub fn export_invoice_json(invoice: &Invoice) -> Result<String, BillingError> {
    serde_json::to_string_pretty(invoice).map_err(|e| BillingError::Serialization(e.to_string()))
}

/// Serialize a page of invoices as a JSON array.
pub fn export_invoices_json(invoices: &[Invoice]) -> Result<String, BillingError> {
    serde_json::to_string_pretty(invoices).map_err(|e| BillingError::Serialization(e.to_string()))
}
