//! Session bootstrap pipeline.
//!
//! Every page request must carry a usable anonymous credential and a cart
//! identifier before page logic runs. This module is the decision core of
//! that guarantee: given what the request's cookies held, it decides which
//! upstream calls to make and what new cookie values to hand back. It does
//! no cookie or HTTP work itself, which keeps the short-circuit and error
//! paths testable without a server.
//!
//! The two upstream calls are sequential because cart creation needs the
//! (possibly freshly minted) bearer token.

use std::future::Future;

use chrono::{DateTime, Utc};
use paper_parrot_core::{AnonymousCredential, CartId};
use tracing::debug;

use crate::commerce::CommerceError;
use crate::commerce::types::{AccessTokenResponse, Cart};

/// The upstream operations the bootstrap flow may perform.
///
/// Implemented by the real shopper client; tests substitute a counting
/// mock to assert exactly which calls a given cookie state triggers.
pub trait BootstrapCommerce {
    /// Mint a fresh anonymous token via the implicit grant.
    fn mint_anonymous_token(
        &self,
    ) -> impl Future<Output = Result<AccessTokenResponse, CommerceError>> + Send;

    /// Create a new cart for this session.
    fn create_session_cart(
        &self,
        bearer: &str,
    ) -> impl Future<Output = Result<Cart, CommerceError>> + Send;
}

/// What the request's cookies held when it arrived.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Parsed credential cookie, if present and well-formed.
    pub credential: Option<AnonymousCredential>,
    /// Cart identifier cookie, if present.
    pub cart_id: Option<CartId>,
}

/// Outcome of a successful bootstrap.
#[derive(Debug)]
pub enum Bootstrap {
    /// Both cookies were present and usable; nothing to attach.
    Ready,
    /// One or both values were (re)issued and must be attached as cookies.
    Updated {
        /// Freshly minted credential, if the old one was absent or expired.
        credential: Option<AnonymousCredential>,
        /// Freshly created cart, if no cart cookie was present.
        cart: Option<Cart>,
    },
}

/// Terminal bootstrap failures. Each maps to a 500 with a diagnostic
/// header; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// No client identifier is configured.
    #[error("storefront client id is not configured")]
    MissingClientId,
    /// The token mint returned no usable data.
    #[error("failed to mint anonymous token: {0}")]
    Issuance(#[source] CommerceError),
    /// Cart creation returned no usable data.
    #[error("failed to create cart: {0}")]
    CartCreation(#[source] CommerceError),
}

impl BootstrapError {
    /// Diagnostic message carried in the `x-error-message` response header.
    #[must_use]
    pub const fn diagnostic(&self) -> &'static str {
        match self {
            Self::MissingClientId => "Missing environment variable",
            Self::Issuance(_) => "Failed to get access token",
            Self::CartCreation(_) => "Failed to create cart",
        }
    }
}

/// Run the bootstrap decision pipeline.
///
/// Decision order, short-circuiting:
/// 1. No client id -> fail before any upstream call.
/// 2. Unexpired credential and cart cookie both present -> `Ready`.
/// 3. Missing or expired credential -> mint a new one.
/// 4. Missing cart cookie -> create a cart with the resolved bearer.
///
/// No partial state is handed back on failure: if cart creation fails
/// after a successful mint, the minted credential is dropped with the
/// request.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when configuration is missing or either
/// upstream call fails.
pub async fn run<C: BootstrapCommerce>(
    api: &C,
    client_id: &str,
    state: SessionState,
    now: DateTime<Utc>,
) -> Result<Bootstrap, BootstrapError> {
    if client_id.is_empty() {
        return Err(BootstrapError::MissingClientId);
    }

    // An expired credential is treated exactly like an absent one.
    let valid = state.credential.filter(|c| !c.is_expired(now));

    // An existing cart cookie is trusted without an upstream liveness
    // check; a cart deleted or expired server-side still reads as valid
    // here until the cookie itself lapses.
    if valid.is_some() && state.cart_id.is_some() {
        return Ok(Bootstrap::Ready);
    }

    let minted = if valid.is_none() {
        let token = api
            .mint_anonymous_token()
            .await
            .map_err(BootstrapError::Issuance)?;
        debug!(expires = token.expires, "minted anonymous credential");
        Some(AnonymousCredential {
            access_token: token.access_token,
            token_type: token.token_type,
            expires: token.expires,
            expires_in: token.expires_in,
            identifier: token.identifier,
            client_id: client_id.to_owned(),
        })
    } else {
        None
    };

    let cart = if state.cart_id.is_none() {
        let bearer = minted
            .as_ref()
            .or(valid.as_ref())
            .map(|c| c.access_token.as_str())
            .unwrap_or_default();
        let cart = api
            .create_session_cart(bearer)
            .await
            .map_err(BootstrapError::CartCreation)?;
        debug!(cart_id = %cart.id, "created session cart");
        Some(cart)
    } else {
        None
    };

    Ok(Bootstrap::Updated {
        credential: minted,
        cart,
    })
}
