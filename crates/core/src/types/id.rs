//! Newtype IDs for entity references.
//!
//! The commerce platform hands out opaque string identifiers for every
//! resource; `define_id!` wraps each kind in its own type so a cart id
//! cannot be handed to something expecting a product id.

use serde::{Deserialize, Serialize};

/// Define a string-backed ID newtype.
///
/// The generated type serializes transparently as the inner string,
/// converts from `String`/`&str`, and derives the usual comparison and
/// hashing traits.
///
/// ```rust
/// # use paper_parrot_core::define_id;
/// define_id!(BoxId);
/// define_id!(LabelId);
///
/// let box_id = BoxId::new("3f9c");
/// let label_id = LabelId::new("3f9c");
///
/// // Same inner string, different types; assigning one to the other
/// // would not compile.
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
            /// Wrap a raw identifier string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwrap into the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(CartId);
define_id!(CartItemId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(AccountId);
define_id!(AccountMemberId);
