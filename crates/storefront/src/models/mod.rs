//! Domain models for storefront.
//!
//! The cart and checkout types themselves live in `artifi-core`; this module
//! only holds what is specific to storing them per visitor.

pub mod session;

pub use session::keys as session_keys;
