//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Cart (JSON)
//! GET  /cart                   - Cart contents
//! POST /cart/add               - Add an artwork (merges with an existing line)
//! POST /cart/update            - Set quantity (0 or less removes)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge
//! GET  /cart/shipping          - Shipping policy
//!
//! # Checkout (JSON)
//! GET  /checkout               - Current step (303 to /cart when the cart is empty)
//! POST /checkout/shipping      - Submit shipping info
//! POST /checkout/back          - Payment back to shipping
//! POST /checkout/payment       - Submit payment and place the order
//! POST /checkout/payment/format - Regroup card input while typing
//! ```

pub mod cart;
pub mod checkout;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/shipping", get(cart::shipping_policy))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/shipping", post(checkout::submit_shipping))
        .route("/back", post(checkout::back_to_shipping))
        .route("/payment", post(checkout::submit_payment))
        .route("/payment/format", post(checkout::format_payment_input))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}
