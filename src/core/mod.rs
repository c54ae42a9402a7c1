//! Core billing types, validation, numbering, and storage seams.
//!
//! This module provides the order, settings, and invoice records, the GST
//! state table, amount-in-words rendering, and the gapless invoice
//! sequencer.

mod builder;
mod config;
mod error;
mod gstin;
mod numbering;
mod states;
mod store;
mod types;
mod validation;
mod words;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use gstin::{GstinFormatError, gstin_state_code, validate_gstin};
pub use numbering::*;
pub use states::*;
pub use store::*;
pub use types::*;
pub use validation::*;
pub use words::{amount_to_words, integer_to_words};
