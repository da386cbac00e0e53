//! Storefront services.

pub mod bootstrap;

pub use bootstrap::{Bootstrap, BootstrapCommerce, BootstrapError, SessionState};
