//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tower_cookies::Key;

use crate::commerce::{CommerceError, ShopperClient};
use crate::config::StorefrontConfig;

/// Error constructing application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cookie secret must be at least 32 bytes")]
    CookieSecretTooShort,
    #[error("commerce client error: {0}")]
    Commerce(#[from] CommerceError),
}

/// State shared by every handler: the validated configuration, the
/// shopper client, and the key that signs session cookies. Clones share
/// one `Arc`-held inner.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    shopper: ShopperClient,
    cookie_key: Key,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie secret is too short to derive a
    /// signing key from, or if the shopper client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let secret = config.cookie_secret.expose_secret();
        if secret.len() < 32 {
            return Err(StateError::CookieSecretTooShort);
        }
        let cookie_key = Key::derive_from(secret.as_bytes());

        let shopper = ShopperClient::new(&config.commerce)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                shopper,
                cookie_key,
            }),
        })
    }

    /// The storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The shopper API client.
    #[must_use]
    pub fn shopper(&self) -> &ShopperClient {
        &self.inner.shopper
    }

    /// The cookie signing key.
    #[must_use]
    pub fn cookie_key(&self) -> &Key {
        &self.inner.cookie_key
    }
}
