//! Session gate middleware.
//!
//! Runs before every page request and guarantees the request carries a
//! usable anonymous credential cookie and a cart-identifier cookie before
//! page logic sees it. The decision logic lives in
//! [`crate::services::bootstrap`]; this middleware only does the cookie and
//! response plumbing around it.
//!
//! API routes, health checks, and static assets are not wrapped by this
//! middleware - that exclusion is wiring in the router, not logic here.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use paper_parrot_core::CartId;
use tower_cookies::Cookies;

use crate::error::AppError;
use crate::models::cookies::{
    CART_COOKIE_NAME, CREDENTIALS_COOKIE_NAME, cart_cookie, credential_cookie, decode_credential,
};
use crate::services::bootstrap::{self, Bootstrap, BootstrapError, SessionState};
use crate::state::AppState;

/// Diagnostic header attached to fatal bootstrap responses.
pub const ERROR_MESSAGE_HEADER: &str = "x-error-message";

/// Ensure the request has a credential cookie and a cart cookie.
///
/// On the fast path (both cookies present and usable) no upstream call is
/// made and the request passes through untouched. Otherwise the missing
/// pieces are minted and attached as signed `Set-Cookie` headers on the
/// pass-through response. Any upstream failure is terminal: the request is
/// answered with a 500 and a diagnostic header, and no cookies are
/// committed.
pub async fn session_gate_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    request: Request,
    next: Next,
) -> Response {
    let signed = cookies.signed(state.cookie_key());

    let session = SessionState {
        credential: signed
            .get(CREDENTIALS_COOKIE_NAME)
            .and_then(|cookie| decode_credential(cookie.value())),
        cart_id: signed
            .get(CART_COOKIE_NAME)
            .map(|cookie| CartId::new(cookie.value())),
    };

    let client_id = state.config().commerce.client_id.clone();
    let outcome = bootstrap::run(state.shopper(), &client_id, session, Utc::now()).await;

    match outcome {
        Ok(Bootstrap::Ready) => next.run(request).await,
        Ok(Bootstrap::Updated { credential, cart }) => {
            if let Some(credential) = credential {
                match credential_cookie(&credential) {
                    Ok(cookie) => signed.add(cookie),
                    Err(err) => {
                        return AppError::Internal(format!(
                            "failed to encode credential cookie: {err}"
                        ))
                        .into_response();
                    }
                }
            }

            if let Some(cart) = cart {
                signed.add(cart_cookie(&cart.id, cart.meta.timestamps.expires_at));
            }

            next.run(request).await
        }
        Err(err) => {
            tracing::error!(error = %err, "session bootstrap failed");
            bootstrap_failure(&err)
        }
    }
}

/// Build the terminal 500 response for a bootstrap failure.
fn bootstrap_failure(err: &BootstrapError) -> Response {
    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
    response.headers_mut().insert(
        HeaderName::from_static(ERROR_MESSAGE_HEADER),
        HeaderValue::from_static(err.diagnostic()),
    );
    response
}
