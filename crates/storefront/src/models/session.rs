//! Session-related types.
//!
//! Everything the storefront remembers about a visitor lives in their
//! session: the cart snapshot and the checkout progress.

/// Session keys for visitor state.
pub mod keys {
    /// Key for the serialized cart snapshot.
    pub const CART: &str = artifi_core::cart::CART_STORAGE_KEY;

    /// Key for the checkout state machine.
    pub const CHECKOUT: &str = "checkout";
}
