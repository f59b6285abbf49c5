//! Order placement.
//!
//! There is no payment processor behind this storefront yet. The
//! [`SimulatedOrderService`] stands in for one: it waits a configurable
//! processing delay, declines a set of well-known test cards and otherwise
//! issues an `ORD-` number. [`WithTimeout`] bounds any placement service.

use std::time::Duration;

use artifi_core::OrderId;
use artifi_core::checkout::{
    OrderConfirmation, OrderPlacement, OrderPlacementError, OrderRequest,
};
use rand::Rng;
use secrecy::ExposeSecret;
use tracing::{info, instrument, warn};

use crate::config::OrderServiceConfig;

/// The placement service wired into the storefront.
pub type OrderService = WithTimeout<SimulatedOrderService>;

/// Card that is always declined.
pub const DECLINED_TEST_CARD: &str = "4000000000000002";

/// Card that always fails with a processing error.
pub const PROCESSING_ERROR_TEST_CARD: &str = "4000000000000119";

/// Upper bound (exclusive) of generated order numbers.
const ORDER_NUMBER_LIMIT: u32 = 10_000;

/// Build the storefront's order service from configuration.
#[must_use]
pub fn order_service(config: &OrderServiceConfig) -> OrderService {
    WithTimeout::new(
        SimulatedOrderService::new(config.simulated_latency),
        config.placement_timeout,
    )
}

/// Simulated payment processor.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedOrderService {
    latency: Duration,
}

impl SimulatedOrderService {
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl OrderPlacement for SimulatedOrderService {
    #[instrument(skip_all, fields(items = request.items.len(), amount_due = %request.totals.amount_due()))]
    async fn place_order(
        &self,
        request: &OrderRequest<'_>,
    ) -> Result<OrderConfirmation, OrderPlacementError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match request.payment.card_number().expose_secret() {
            DECLINED_TEST_CARD => {
                return Err(OrderPlacementError::Declined(
                    "card declined by issuer".to_string(),
                ));
            }
            PROCESSING_ERROR_TEST_CARD => {
                return Err(OrderPlacementError::Unavailable(
                    "processing error".to_string(),
                ));
            }
            _ => {}
        }

        let number = rand::rng().random_range(0..ORDER_NUMBER_LIMIT);
        let order_id = OrderId::parse(&format!("ORD-{number}"))
            .ok_or_else(|| OrderPlacementError::Unavailable("no order number issued".to_string()))?;

        info!(order_id = %order_id, "payment accepted");
        Ok(OrderConfirmation { order_id })
    }
}

/// Fails a placement that takes longer than `limit`.
///
/// A timed-out call is reported as retryable; whatever the inner service
/// was doing is dropped.
#[derive(Debug, Clone)]
pub struct WithTimeout<P> {
    inner: P,
    limit: Duration,
}

impl<P> WithTimeout<P> {
    #[must_use]
    pub const fn new(inner: P, limit: Duration) -> Self {
        Self { inner, limit }
    }

    #[must_use]
    pub const fn limit(&self) -> Duration {
        self.limit
    }
}

impl<P: OrderPlacement> OrderPlacement for WithTimeout<P> {
    async fn place_order(
        &self,
        request: &OrderRequest<'_>,
    ) -> Result<OrderConfirmation, OrderPlacementError> {
        if let Ok(result) = tokio::time::timeout(self.limit, self.inner.place_order(request)).await {
            result
        } else {
            warn!(limit_secs = self.limit.as_secs(), "order placement timed out");
            Err(OrderPlacementError::TimedOut(self.limit))
        }
    }
}
