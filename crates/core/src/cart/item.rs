//! Cart line items and the in-memory cart collection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ArtworkId;

/// Errors rejecting a cart mutation because of malformed input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidItemError {
    /// The artwork id is empty or only whitespace.
    #[error("cart item id cannot be empty")]
    EmptyId,
    /// The unit price is below zero.
    #[error("price for {id} cannot be negative")]
    NegativePrice {
        /// Offending artwork id.
        id: String,
    },
    /// An add was requested with a quantity of zero.
    #[error("quantity for {id} must be at least 1")]
    ZeroQuantity {
        /// Offending artwork id.
        id: String,
    },
    /// The quantity does not fit in a cart line.
    #[error("quantity for {id} is too large")]
    QuantityTooLarge {
        /// Offending artwork id.
        id: String,
    },
    /// The change would push the cart total past [`MAX_CART_TOTAL`].
    #[error("cart total would be too large with {id}")]
    TotalOverflow {
        /// Offending artwork id.
        id: String,
    },
}

/// Largest cart subtotal accepted ($1,000,000,000,000). Leaves room for
/// shipping and tax on top without overflowing `Decimal`.
pub const MAX_CART_TOTAL: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// An artwork record as supplied by the catalog, before it enters the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub id: String,
    pub title: String,
    pub artist_name: String,
    pub price: Decimal,
    pub image: String,
}

/// One artwork entry in the cart.
///
/// The unit price is a snapshot taken when the item was added and is never
/// re-fetched from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ArtworkId,
    pub title: String,
    pub artist_name: String,
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// Price multiplied by quantity, unrounded.
    ///
    /// Lines in a [`Cart`] never exceed [`MAX_CART_TOTAL`], so this cannot
    /// overflow for them.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    fn checked_line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Ordered collection of line items.
///
/// Every item has a unique id and a quantity of at least 1. Mutation goes
/// through [`CartStore`](super::CartStore), which also persists each change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Build a cart from a restored snapshot, repairing anything that would
    /// break the invariants.
    ///
    /// Duplicate ids are merged by summing quantities (first position wins).
    /// Items with blank ids, zero quantity or negative prices are dropped, as
    /// is any item that would push the total past [`MAX_CART_TOTAL`].
    #[must_use]
    pub fn from_snapshot(items: Vec<CartItem>) -> Self {
        let mut cart = Self::default();
        for item in items {
            if item.id.is_blank() || item.quantity == 0 || item.price.is_sign_negative() {
                tracing::warn!(id = %item.id, "dropping malformed cart item from snapshot");
                continue;
            }
            let id = item.id.clone();
            match cart.with_item(item) {
                Ok(merged) => cart = merged,
                Err(e) => tracing::warn!(id = %id, error = %e, "dropping cart item from snapshot"),
            }
        }
        cart.check_invariants();
        cart
    }

    /// This cart with `item` merged in by id.
    ///
    /// # Errors
    ///
    /// Returns `QuantityTooLarge` if the merged quantity overflows, or
    /// `TotalOverflow` if the total would pass [`MAX_CART_TOTAL`].
    pub(super) fn with_item(&self, item: CartItem) -> Result<Self, InvalidItemError> {
        let id = item.id.to_string();
        let mut next = self.clone();
        match next.position(&id) {
            Some(index) => {
                if let Some(existing) = next.items.get_mut(index) {
                    existing.quantity = existing
                        .quantity
                        .checked_add(item.quantity)
                        .ok_or_else(|| InvalidItemError::QuantityTooLarge { id: id.clone() })?;
                }
            }
            None => next.items.push(item),
        }
        next.ensure_total_in_range(&id)?;
        Ok(next)
    }

    /// This cart with the line for `index` set to `quantity`.
    ///
    /// # Errors
    ///
    /// Returns `TotalOverflow` if the total would pass [`MAX_CART_TOTAL`].
    pub(super) fn with_quantity(&self, index: usize, quantity: u32) -> Result<Self, InvalidItemError> {
        let mut next = self.clone();
        if let Some(existing) = next.items.get_mut(index) {
            existing.quantity = quantity;
            let id = existing.id.to_string();
            next.ensure_total_in_range(&id)?;
        }
        Ok(next)
    }

    fn ensure_total_in_range(&self, id: &str) -> Result<(), InvalidItemError> {
        match self.checked_total_price() {
            Some(total) if total <= MAX_CART_TOTAL => Ok(()),
            _ => Err(InvalidItemError::TotalOverflow { id: id.to_owned() }),
        }
    }

    fn checked_total_price(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.checked_line_total()?))
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up an item by artwork id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price * quantity` over all items, unrounded.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub(super) fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id.as_str() == id)
    }

    pub(super) fn items_mut(&mut self) -> &mut Vec<CartItem> {
        &mut self.items
    }

    /// Panics if an id repeats, a quantity is zero or the total is out of
    /// range.
    pub(super) fn check_invariants(&self) {
        for (index, item) in self.items.iter().enumerate() {
            assert!(item.quantity >= 1, "cart item {} has quantity 0", item.id);
            assert!(
                !self.items.iter().skip(index + 1).any(|other| other.id == item.id),
                "cart item {} appears more than once",
                item.id
            );
        }
        assert!(
            self.checked_total_price().is_some_and(|total| total <= MAX_CART_TOTAL),
            "cart total exceeds {MAX_CART_TOTAL}"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, cents: i64, quantity: u32) -> CartItem {
        CartItem {
            id: ArtworkId::parse(id).unwrap(),
            title: format!("Artwork {id}"),
            artist_name: "NeuroArtisan".to_string(),
            price: Decimal::new(cents, 2),
            image: format!("https://img.example/{id}.jpg"),
            quantity,
        }
    }

    #[test]
    fn test_totals() {
        let cart = Cart::from_snapshot(vec![item("a", 5000, 1), item("b", 3000, 2)]);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Decimal::new(110, 0));
    }

    #[test]
    fn test_snapshot_merges_duplicates_in_first_position() {
        let cart = Cart::from_snapshot(vec![
            item("a", 1000, 1),
            item("b", 2000, 1),
            item("a", 1000, 2),
        ]);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].id.as_str(), "a");
        assert_eq!(cart.get("a").unwrap().quantity, 3);
    }

    #[test]
    fn test_snapshot_drops_malformed_items() {
        let mut negative = item("neg", 100, 1);
        negative.price = Decimal::new(-100, 2);
        let blank: CartItem = serde_json::from_value(serde_json::json!({
            "id": " ",
            "title": "t",
            "artistName": "a",
            "price": "1.00",
            "image": "i",
            "quantity": 1
        }))
        .unwrap();

        let cart = Cart::from_snapshot(vec![item("zero", 100, 0), negative, blank, item("ok", 100, 1)]);
        assert_eq!(cart.len(), 1);
        assert!(cart.get("ok").is_some());
    }

    #[test]
    fn test_max_cart_total_is_one_trillion() {
        assert_eq!(MAX_CART_TOTAL, Decimal::new(1_000_000_000_000, 0));
    }

    #[test]
    fn test_snapshot_drops_items_past_the_total_limit() {
        let mut huge = item("huge", 0, 2);
        huge.price = Decimal::MAX;
        let mut past_limit = item("c", 0, 1);
        past_limit.price = MAX_CART_TOTAL;
        let mut too_many = item("a", 100, 1);
        too_many.quantity = u32::MAX;

        let cart = Cart::from_snapshot(vec![
            item("a", 100, 1),
            huge,
            past_limit,
            too_many,
            item("b", 200, 1),
        ]);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get("a").unwrap().quantity, 1);
        assert_eq!(cart.total_price(), Decimal::new(3, 0));
    }

    #[test]
    #[should_panic(expected = "has quantity 0")]
    fn test_invariant_violation_panics() {
        let cart = Cart {
            items: vec![item("a", 100, 0)],
        };
        cart.check_invariants();
    }

    #[test]
    #[should_panic(expected = "appears more than once")]
    fn test_duplicate_ids_panic() {
        let cart = Cart {
            items: vec![item("a", 100, 1), item("a", 100, 1)],
        };
        cart.check_invariants();
    }

    #[test]
    fn test_snapshot_json_shape() {
        let cart = Cart::from_snapshot(vec![item("a", 29999, 1)]);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json[0]["artistName"], "NeuroArtisan");
        assert_eq!(json[0]["price"], "299.99");
        assert_eq!(json[0]["quantity"], 1);
    }
}
