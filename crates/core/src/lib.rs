//! Artifi Core - cart and order pricing engine.
//!
//! This crate holds the domain logic shared by the Artifi components:
//! - `storefront` - JSON cart and checkout API
//! - `cli` - Command-line tools for migrations and price quotes
//!
//! # Architecture
//!
//! The core crate performs no I/O of its own. Cart persistence goes through
//! the [`cart::CartStorage`] trait and order placement through the
//! [`checkout::OrderPlacement`] trait; the storefront supplies both.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and prices
//! - [`cart`] - Cart contents, persistence and mutations
//! - [`pricing`] - Shipping, tax and total rules
//! - [`checkout`] - The checkout state machine and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartItem, CartStore, NewCartItem};
pub use checkout::{Checkout, CheckoutError, CheckoutStep, Order};
pub use pricing::{OrderTotals, PricingConfig};
pub use types::*;
