//! Shopping cart state.
//!
//! [`CartStore`] is the single source of truth for a visitor's cart. It
//! guarantees that every line has a unique artwork id and a quantity of at
//! least 1, and writes a JSON snapshot to a [`CartStorage`] backend after
//! every mutation so the cart survives reloads.

mod item;
mod storage;
mod store;

pub use item::{Cart, CartItem, InvalidItemError, MAX_CART_TOTAL, NewCartItem};
pub use storage::{CART_STORAGE_KEY, CartStorage, MemoryStorage, StorageError};
pub use store::{CartStore, PersistenceWarning};
