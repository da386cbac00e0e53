//! Extractors for shopper session cookies.
//!
//! Route handlers pull the anonymous credential and cart id out of the
//! signed jar through these extractors instead of touching cookies
//! directly.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::Utc;
use paper_parrot_core::{AnonymousCredential, CartId};
use tower_cookies::Cookies;

use crate::error::AppError;
use crate::models::cookies::{CART_COOKIE_NAME, CREDENTIALS_COOKIE_NAME, decode_credential};
use crate::state::AppState;

/// Extractor that requires a usable anonymous credential cookie.
///
/// Page routes get one from the session gate; API routes are outside the
/// gate, so a caller that never loaded a page is rejected here.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(ShopperCredential(credential): ShopperCredential) -> impl IntoResponse {
///     // credential.access_token is the bearer for shopper API calls
/// }
/// ```
pub struct ShopperCredential(pub AnonymousCredential);

impl<S> FromRequestParts<S> for ShopperCredential
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        let cookies = parts
            .extensions
            .get::<Cookies>()
            .cloned()
            .ok_or_else(|| AppError::Internal("cookie layer not installed".to_string()))?;

        let credential = cookies
            .signed(app.cookie_key())
            .get(CREDENTIALS_COOKIE_NAME)
            .and_then(|cookie| decode_credential(cookie.value()))
            .filter(|credential| !credential.is_expired(Utc::now()))
            .ok_or_else(|| AppError::Unauthorized("Shopper session not initialized".to_string()))?;

        Ok(Self(credential))
    }
}

/// Extractor for the cart cookie, if any.
///
/// Presence is all it checks; the cart is never re-validated upstream
/// here. Handlers that need a cart map `None` to a client error.
pub struct SessionCart(pub Option<CartId>);

impl<S> FromRequestParts<S> for SessionCart
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        let cart_id = parts.extensions.get::<Cookies>().and_then(|cookies| {
            cookies
                .signed(app.cookie_key())
                .get(CART_COOKIE_NAME)
                .map(|cookie| CartId::new(cookie.value()))
        });

        Ok(Self(cart_id))
    }
}

impl SessionCart {
    /// The cart id, or the client error the original storefront raises
    /// when an action runs before the session gate ever set a cart.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` when no cart cookie is present.
    pub fn required(self) -> Result<CartId, AppError> {
        self.0
            .ok_or_else(|| AppError::BadRequest("Cart has not been initialized".to_string()))
    }
}
