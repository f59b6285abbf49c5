//! The order placement collaborator.

use std::future::Future;
use std::time::Duration;

use crate::cart::CartItem;
use crate::pricing::OrderTotals;
use crate::types::OrderId;

use super::payment::PaymentDetails;
use super::shipping::ShippingInfo;

/// Errors reported by an [`OrderPlacement`] service.
///
/// All of these leave the checkout on the payment step so the customer can
/// retry without re-entering shipping details.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderPlacementError {
    /// The payment was refused.
    #[error("payment declined: {0}")]
    Declined(String),
    /// The service could not process the order.
    #[error("order service unavailable: {0}")]
    Unavailable(String),
    /// No answer within the configured limit.
    #[error("order placement timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Everything the placement service needs to charge and record an order.
#[derive(Debug, Clone, Copy)]
pub struct OrderRequest<'a> {
    pub items: &'a [CartItem],
    pub shipping: &'a ShippingInfo,
    pub payment: &'a PaymentDetails,
    pub totals: &'a OrderTotals,
}

/// Successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
}

/// Takes payment and records an order.
///
/// The checkout awaits exactly one call per attempt and only clears the cart
/// once it returns `Ok`.
pub trait OrderPlacement: Send + Sync {
    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderPlacementError` if the payment is declined, the service
    /// fails, or the call times out.
    fn place_order(
        &self,
        request: &OrderRequest<'_>,
    ) -> impl Future<Output = Result<OrderConfirmation, OrderPlacementError>> + Send;
}
