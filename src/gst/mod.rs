//! GST rate resolution and tax computation.
//!
//! Resolves each line's rate through the item → category → default chain,
//! classifies the supply as intra-state or inter-state from the seller and
//! buyer state codes, and computes CGST/SGST or IGST per line.
//!
//! # Example
//!
//! ```
//! use gstbill::core::*;
//! use gstbill::gst::*;
//! use rust_decimal_macros::dec;
//!
//! let table = JurisdictionTable::india();
//! let settings = TaxSettingsBuilder::new("Shop", "08").build();
//! let items = [OrderItemBuilder::new("p1", "Lamp", dec!(118), 1).build()];
//!
//! let b = GstCalculator::new(&table)
//!     .compute(&items, "08", "Maharashtra", &settings, &EmptyCatalog)
//!     .unwrap();
//! assert_eq!(b.supply_type, SupplyType::InterState);
//! assert_eq!(b.total_igst, dec!(18.00));
//! ```

mod calculator;
mod rules;

pub use calculator::{GstCalculator, compute_line, determine_supply_type};
pub use rules::{DEFAULT_CHAIN, RateInputs, RateRule, ResolvedRate, TaxRuleResolver};
