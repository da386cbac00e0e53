//! Session cookie codec.
//!
//! All session state is client-held: the anonymous credential, the cart
//! identifier, and the account-member token each live in their own signed
//! cookie. This module knows how to build and read those cookie values and
//! nothing about HTTP - handlers and middleware own the jar, the codec owns
//! the format.
//!
//! Cookie expiry mirrors what the value itself reports: the credential
//! cookie lapses when the token does, the cart cookie when the upstream
//! cart does. The browser dropping the cookie is what ultimately retires
//! stale session state.

use chrono::{DateTime, Utc};
use paper_parrot_core::{AccountMemberCredential, AnonymousCredential, CartId};
use tower_cookies::cookie::time::OffsetDateTime;
use tower_cookies::cookie::{Cookie, SameSite};

/// Cookie holding the JSON-encoded anonymous credential.
pub const CREDENTIALS_COOKIE_NAME: &str = "_store_ep_credentials";

/// Cookie holding the raw cart identifier.
pub const CART_COOKIE_NAME: &str = "_store_ep_cart";

/// Cookie holding the raw account-member token.
pub const ACCOUNT_COOKIE_NAME: &str = "_store_ep_account_member_token";

/// Parse a credential cookie value.
///
/// Garbage reads as absent: a cookie that fails to parse triggers the same
/// re-mint path as a missing one.
#[must_use]
pub fn decode_credential(raw: &str) -> Option<AnonymousCredential> {
    serde_json::from_str(raw).ok()
}

/// Build the credential cookie from a freshly minted credential.
///
/// # Errors
///
/// Returns an error if the credential cannot be serialized.
pub fn credential_cookie(
    credential: &AnonymousCredential,
) -> Result<Cookie<'static>, serde_json::Error> {
    let value = serde_json::to_string(credential)?;
    let mut cookie = Cookie::new(CREDENTIALS_COOKIE_NAME, value);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    if let Some(expires) = credential.expires_at().and_then(expiration) {
        cookie.set_expires(expires);
    }
    Ok(cookie)
}

/// Build the cart cookie for a cart id, expiring when the cart does.
#[must_use]
pub fn cart_cookie(cart_id: &CartId, expires_at: DateTime<Utc>) -> Cookie<'static> {
    let mut cookie = Cookie::new(CART_COOKIE_NAME, cart_id.as_str().to_owned());
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    if let Some(expires) = expiration(expires_at) {
        cookie.set_expires(expires);
    }
    cookie
}

/// Build the account cookie from an account-member credential.
///
/// Unlike the shopper cookies this one is `HttpOnly`: only the server ever
/// presents the account token upstream.
#[must_use]
pub fn account_cookie(credential: &AccountMemberCredential) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCOUNT_COOKIE_NAME, credential.token.clone());
    cookie.set_same_site(SameSite::Strict);
    cookie.set_http_only(true);
    cookie.set_path("/");
    if let Some(expires) = expiration(credential.expires) {
        cookie.set_expires(expires);
    }
    cookie
}

/// Cookie used to clear the account cookie on logout.
#[must_use]
pub fn expired_account_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCOUNT_COOKIE_NAME, "");
    cookie.set_path("/");
    cookie
}

fn expiration(at: DateTime<Utc>) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(at.timestamp()).ok()
}
