//! Account authentication route handlers.
//!
//! Login exchanges an email and password for an account-member token via
//! the platform's password profile; the token is held in a signed,
//! `HttpOnly` cookie with the token's own expiry. There is no server-side
//! session to destroy on logout - clearing the cookie is the whole story.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use paper_parrot_core::Email;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use tracing::instrument;

use crate::commerce::CommerceError;
use crate::error::{AppError, Result};
use crate::middleware::ShopperCredential;
use crate::models::cookies::{account_cookie, expired_account_cookie};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub account_id: String,
    pub account_name: String,
    pub expires: DateTime<Utc>,
}

/// Log an account member in.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    ShopperCredential(credential): ShopperCredential,
    Json(form): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if form.email.is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let email = Email::parse(&form.email)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let member_token = state
        .shopper()
        .account_member_token(&credential.access_token, email.as_str(), &form.password)
        .await
        .map_err(|err| match err {
            // The platform answers 4xx for bad credentials; don't leak which
            // part was wrong.
            CommerceError::Api { status, .. } if (400..500).contains(&status) => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            other => AppError::from(other),
        })?;

    cookies
        .signed(state.cookie_key())
        .add(account_cookie(&member_token));

    Ok(Json(LoginResponse {
        account_id: member_token.account_id,
        account_name: member_token.account_name,
        expires: member_token.expires,
    }))
}

/// Log the account member out by clearing the account cookie.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> StatusCode {
    cookies
        .signed(state.cookie_key())
        .remove(expired_account_cookie());

    StatusCode::NO_CONTENT
}
