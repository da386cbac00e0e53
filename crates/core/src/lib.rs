//! Paper Parrot Core - Shared types library.
//!
//! Types only, no I/O. The commerce platform is the source of truth for
//! carts, orders, and accounts; everything in [`types`] is a typed view of
//! what it hands back or what the storefront persists client-side in
//! cookies: newtype IDs, email parsing, and the credential records.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
