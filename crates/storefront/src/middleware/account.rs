//! Account authentication extractor.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tower_cookies::Cookies;

use crate::error::AppError;
use crate::models::cookies::ACCOUNT_COOKIE_NAME;
use crate::state::AppState;

/// Extractor that requires a logged-in account member.
///
/// Carries the raw account-member token from the signed account cookie;
/// the token is only ever replayed upstream in the account management
/// authentication header, never inspected locally. Cookie expiry (set to
/// the token's own expiry at login) is what retires stale tokens.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAccount(token): RequireAccount) -> impl IntoResponse {
///     // pass token to account-scoped shopper calls
/// }
/// ```
pub struct RequireAccount(pub String);

impl<S> FromRequestParts<S> for RequireAccount
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        let token = parts
            .extensions
            .get::<Cookies>()
            .and_then(|cookies| {
                cookies
                    .signed(app.cookie_key())
                    .get(ACCOUNT_COOKIE_NAME)
                    .map(|cookie| cookie.value().to_string())
            })
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("No account token found".to_string()))?;

        Ok(Self(token))
    }
}
