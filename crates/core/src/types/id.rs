//! Newtype IDs for type-safe entity references.
//!
//! Artworks and orders are identified by opaque strings issued elsewhere
//! (the catalog and the order placement service). Use the `define_id!` macro
//! to create wrappers that prevent mixing the two up.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()` rejecting empty or whitespace-only input
/// - `as_str()`, `Display` and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use artifi_core::define_id;
/// define_id!(ArtistId);
///
/// let id = ArtistId::parse("artist-1").unwrap();
/// assert_eq!(id.as_str(), "artist-1");
/// assert!(ArtistId::parse("   ").is_none());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID, returning `None` if it is empty or only whitespace.
            #[must_use]
            pub fn parse(id: &str) -> Option<Self> {
                if id.trim().is_empty() {
                    None
                } else {
                    Some(Self(id.to_owned()))
                }
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the ID is blank. Only possible for deserialized values.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ArtworkId);
define_id!(OrderId);
