//! Business logic services for storefront.
//!
//! # Services
//!
//! - `orders` - Order placement (simulated processor plus timeout wrapper)
//! - `session_cart` - Cart snapshot storage in the visitor's session

pub mod orders;
pub mod session_cart;

pub use orders::{OrderService, SimulatedOrderService, WithTimeout};
pub use session_cart::{SessionCart, SessionCartStorage};
