//! Shared type definitions.

pub mod credential;
pub mod email;
pub mod id;

pub use credential::{AccountMemberCredential, AnonymousCredential};
pub use email::{Email, EmailError};
pub use id::{AccountId, AccountMemberId, CartId, CartItemId, OrderId, ProductId};
