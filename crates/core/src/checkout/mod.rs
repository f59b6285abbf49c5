//! Checkout: shipping capture, payment, order placement and confirmation.
//!
//! [`Checkout`] is the state machine. It borrows the visitor's
//! [`CartStore`](crate::cart::CartStore) only for the duration of
//! [`Checkout::place_order`], which is the single place an order is created
//! and the cart cleared.

mod flow;
mod order;
mod payment;
mod placement;
mod shipping;

pub use flow::{Checkout, CheckoutError, CheckoutStep};
pub use order::Order;
pub use payment::{PaymentDetails, PaymentError, format_card_number, format_exp_date};
pub use placement::{OrderConfirmation, OrderPlacement, OrderPlacementError, OrderRequest};
pub use shipping::{ShippingInfo, ShippingInfoError};
