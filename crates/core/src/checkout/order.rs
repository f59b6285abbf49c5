//! Finalized orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::pricing::OrderTotals;
use crate::types::OrderId;

use super::shipping::ShippingInfo;

/// An immutable record of a completed checkout.
///
/// Items, shipping info and totals are copies taken when the order was
/// placed; later changes to the cart never reach an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    items: Vec<CartItem>,
    shipping: ShippingInfo,
    totals: OrderTotals,
    card_last4: String,
    placed_at: DateTime<Utc>,
}

impl Order {
    pub(super) fn new(
        id: OrderId,
        items: Vec<CartItem>,
        shipping: ShippingInfo,
        totals: OrderTotals,
        card_last4: String,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            items,
            shipping,
            totals,
            card_last4,
            placed_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub const fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    #[must_use]
    pub const fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    /// Last four digits of the card charged.
    #[must_use]
    pub fn card_last4(&self) -> &str {
        &self.card_last4
    }

    #[must_use]
    pub const fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Sum of quantities across the order's items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Grand total as charged, rounded to cents.
    #[must_use]
    pub fn amount_due(&self) -> Decimal {
        self.totals.amount_due()
    }
}
