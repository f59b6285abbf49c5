//! Core types for Artifi.
//!
//! Type-safe wrappers for identifiers and money.

pub mod id;
pub mod price;

pub use id::*;
pub use price::{CurrencyCode, Price, round_cents};
