//! Cart snapshots kept in the visitor's session.
//!
//! `CartStorage` is synchronous while the session store is async, so a
//! handler loads the snapshot up front, lets the cart store read and write
//! the in-memory copy, and flushes the last write back to the session before
//! responding.

use artifi_core::CartStore;
use artifi_core::cart::{CART_STORAGE_KEY, CartStorage, StorageError};
use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;

/// A cart store backed by the session.
pub type SessionCart = CartStore<SessionCartStorage>;

/// Buffered view of the session's cart snapshot.
#[derive(Debug, Default)]
pub struct SessionCartStorage {
    snapshot: Option<String>,
    pending: Option<String>,
    load_error: Option<String>,
}

impl SessionCartStorage {
    /// Read the cart snapshot from the session.
    ///
    /// A failed read is not fatal: it surfaces through [`CartStorage::get`]
    /// and the cart starts empty.
    pub async fn load(session: &Session) -> Self {
        match session.get::<String>(session_keys::CART).await {
            Ok(snapshot) => Self {
                snapshot,
                ..Self::default()
            },
            Err(e) => Self {
                load_error: Some(e.to_string()),
                ..Self::default()
            },
        }
    }

    /// Whether a write is waiting to be flushed.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// Write the last snapshot back to the session, if there is one.
    ///
    /// # Errors
    ///
    /// Returns the session error if the write fails.
    pub async fn flush(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        if let Some(snapshot) = self.pending {
            session.insert(session_keys::CART, snapshot).await?;
        }
        Ok(())
    }
}

impl CartStorage for SessionCartStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if key != CART_STORAGE_KEY {
            return Ok(None);
        }
        if let Some(error) = &self.load_error {
            return Err(StorageError::Unavailable(error.clone()));
        }
        Ok(self.pending.clone().or_else(|| self.snapshot.clone()))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if key != CART_STORAGE_KEY {
            return Err(StorageError::Unavailable(format!(
                "session only stores the cart, not {key}"
            )));
        }
        self.pending = Some(value);
        Ok(())
    }
}

/// Restore the visitor's cart from the session.
pub async fn load_cart(session: &Session) -> SessionCart {
    CartStore::restore(SessionCartStorage::load(session).await)
}

/// Persist the cart snapshot. Failures are logged; the response still goes
/// out with the in-memory cart.
pub async fn save_cart(session: &Session, cart: SessionCart) {
    if let Err(e) = cart.into_storage().flush(session).await {
        warn!(error = %e, key = CART_STORAGE_KEY, "failed to persist cart snapshot");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use artifi_core::NewCartItem;
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn artwork() -> NewCartItem {
        NewCartItem {
            id: "art-1".into(),
            title: "Digital Dreams".into(),
            artist_name: "AI Artist".into(),
            price: Decimal::new(10_000, 2),
            image: "/images/dreams.png".into(),
        }
    }

    #[test]
    fn test_other_keys_are_refused() {
        let mut storage = SessionCartStorage::default();
        assert!(storage.set("something-else", "x".into()).is_err());
        assert_eq!(storage.get("something-else").unwrap(), None);
        assert!(!storage.is_dirty());
    }

    #[test]
    fn test_load_error_surfaces_on_read() {
        let storage = SessionCartStorage {
            load_error: Some("store offline".into()),
            ..SessionCartStorage::default()
        };
        assert!(matches!(
            storage.get(CART_STORAGE_KEY),
            Err(StorageError::Unavailable(_))
        ));

        let store = CartStore::restore(storage);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_cart_survives_a_round_trip_through_the_session() {
        let session = session();

        let mut cart = load_cart(&session).await;
        assert!(cart.is_empty());
        cart.add_item(artwork(), 2).unwrap();
        save_cart(&session, cart).await;

        let restored = load_cart(&session).await;
        assert_eq!(restored.total_items(), 2);
        assert_eq!(restored.total_price(), Decimal::new(20_000, 2));
    }

    #[tokio::test]
    async fn test_untouched_cart_is_not_written() {
        let session = session();
        let cart = load_cart(&session).await;
        assert!(!cart.storage().is_dirty());

        save_cart(&session, cart).await;

        assert!(session.get::<String>(session_keys::CART).await.unwrap().is_none());
    }
}
