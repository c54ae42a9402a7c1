//! Invoice issuance on top of the storage traits.
//!
//! [`InvoiceAssembler`] checks eligibility, computes GST, allocates a
//! gapless number, and persists the invoice exactly once per order.
//! [`MemoryStore`] implements every storage trait in memory and is the
//! reference backend for tests and demos.
//!
//! With the `json` feature, invoices can be exported as JSON documents
//! for downstream rendering.

mod assembler;
#[cfg(feature = "json")]
mod export;
mod memory;

pub use assembler::InvoiceAssembler;
#[cfg(feature = "json")]
pub use export::{export_invoice_json, export_invoices_json};
pub use memory::MemoryStore;
