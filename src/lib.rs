//! # gstbill
//!
//! GST tax computation and invoice generation for Indian storefronts.
//!
//! Resolves the buyer's state from free-text input, picks a per-line GST
//! rate (item, category, or global default), splits tax into CGST+SGST or
//! IGST, and issues idempotent invoices with gapless numbers and the grand
//! total in Indian-English words.
//!
//! All monetary values use [`rust_decimal::Decimal`], rounded half-up to
//! two places. Never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use gstbill::core::*;
//! use gstbill::gst::GstCalculator;
//! use rust_decimal_macros::dec;
//!
//! let table = JurisdictionTable::india();
//! let settings = TaxSettingsBuilder::new("Print Cafe", "08").build();
//! let items = [OrderItemBuilder::new("p1", "Poster", dec!(118), 1)
//!     .gst_rate(dec!(18))
//!     .build()];
//!
//! let breakdown = GstCalculator::new(&table)
//!     .compute(&items, "08", "rajasthan", &settings, &EmptyCatalog)
//!     .unwrap();
//! assert_eq!(breakdown.supply_type, SupplyType::IntraState);
//! assert_eq!(breakdown.total_cgst + breakdown.total_sgst, dec!(18.00));
//! assert_eq!(amount_to_words(breakdown.total).unwrap(), "One Hundred Eighteen Only");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Order/invoice types, state table, numbering, words, storage traits |
//! | `gst` (default) | Rate resolution and CGST/SGST/IGST computation |
//! | `invoice` (default) | Invoice assembler and in-memory store |
//! | `json` | JSON configuration loading and invoice export |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "gst")]
pub mod gst;

#[cfg(feature = "invoice")]
pub mod invoice;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
