//! The cart store: single owner of the visitor's cart.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::item::{Cart, CartItem, InvalidItemError, NewCartItem};
use super::storage::{CART_STORAGE_KEY, CartStorage, StorageError};
use crate::types::ArtworkId;

/// A snapshot write that failed. The in-memory cart is still authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    /// Storage key that could not be written.
    pub key: &'static str,
    /// Why the write failed.
    pub error: StorageError,
}

/// Owns a [`Cart`] and writes a snapshot to storage after every mutation.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    storage: S,
    warning: Option<PersistenceWarning>,
}

impl<S: CartStorage> CartStore<S> {
    /// Start a session with an empty cart. Nothing is written until the first
    /// mutation.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            cart: Cart::default(),
            storage,
            warning: None,
        }
    }

    /// Start a session from the snapshot in storage.
    ///
    /// A missing, unreadable or malformed snapshot yields an empty cart.
    #[must_use]
    pub fn restore(storage: S) -> Self {
        let cart = match storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartItem>>(&raw) {
                Ok(items) => Cart::from_snapshot(items),
                Err(e) => {
                    warn!(error = %e, "discarding malformed cart snapshot");
                    Cart::default()
                }
            },
            Ok(None) => Cart::default(),
            Err(e) => {
                warn!(error = %e, "could not read cart snapshot");
                Cart::default()
            }
        };

        Self {
            cart,
            storage,
            warning: None,
        }
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    /// Sum of `price * quantity`, unrounded.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.cart.total_price()
    }

    /// Add `qty` of an artwork, merging with an existing line for the same id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidItemError` for a blank id, a negative price, a zero
    /// quantity, or a merged quantity or cart total that is out of range. The
    /// cart is left unchanged.
    pub fn add_item(&mut self, item: NewCartItem, qty: u32) -> Result<(), InvalidItemError> {
        let id = ArtworkId::parse(&item.id).ok_or(InvalidItemError::EmptyId)?;
        if item.price.is_sign_negative() {
            return Err(InvalidItemError::NegativePrice { id: item.id });
        }
        if qty == 0 {
            return Err(InvalidItemError::ZeroQuantity { id: item.id });
        }

        self.cart = self.cart.with_item(CartItem {
            id,
            title: item.title,
            artist_name: item.artist_name,
            price: item.price,
            image: item.image,
            quantity: qty,
        })?;
        self.commit();
        Ok(())
    }

    /// Remove the line for `id`. Removing an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidItemError::EmptyId` for a blank id.
    pub fn remove_item(&mut self, id: &str) -> Result<(), InvalidItemError> {
        let id = ArtworkId::parse(id).ok_or(InvalidItemError::EmptyId)?;
        if let Some(index) = self.cart.position(id.as_str()) {
            self.cart.items_mut().remove(index);
            self.commit();
        }
        Ok(())
    }

    /// Set the quantity for `id`. Zero or negative removes the line; an absent
    /// id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidItemError::EmptyId` for a blank id, `QuantityTooLarge`
    /// past `u32::MAX` and `TotalOverflow` if the cart total would be out of
    /// range. The cart is left unchanged.
    pub fn set_quantity(&mut self, id: &str, qty: i64) -> Result<(), InvalidItemError> {
        if qty <= 0 {
            return self.remove_item(id);
        }
        let id = ArtworkId::parse(id).ok_or(InvalidItemError::EmptyId)?;
        let qty = u32::try_from(qty).map_err(|_| InvalidItemError::QuantityTooLarge {
            id: id.to_string(),
        })?;

        if let Some(index) = self.cart.position(id.as_str()) {
            self.cart = self.cart.with_quantity(index, qty)?;
            self.commit();
        }
        Ok(())
    }

    /// Empty the cart and persist the empty snapshot.
    pub fn clear(&mut self) {
        self.cart.items_mut().clear();
        self.commit();
    }

    /// Take the warning left by the most recent failed snapshot write.
    pub fn take_persistence_warning(&mut self) -> Option<PersistenceWarning> {
        self.warning.take()
    }

    /// The underlying storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the store, returning its storage backend.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn commit(&mut self) {
        self.cart.check_invariants();
        self.persist();
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.cart)
            .map_err(|e| StorageError::Encode(e.to_string()))
            .and_then(|snapshot| self.storage.set(CART_STORAGE_KEY, snapshot));

        match result {
            Ok(()) => {
                debug!(items = self.cart.len(), "cart snapshot persisted");
                self.warning = None;
            }
            Err(error) => {
                warn!(error = %error, key = CART_STORAGE_KEY, "cart snapshot not persisted");
                self.warning = Some(PersistenceWarning {
                    key: CART_STORAGE_KEY,
                    error,
                });
            }
        }
    }
}
