//! Checkout route handler.
//!
//! Orchestrates the full purchase sequence against the commerce platform:
//! payment intent, cart-to-order conversion, order confirmation, and cart
//! replacement. Payment capture itself happens between the platform and the
//! payment processor; the confirmation token arrives from the
//! payment-elements frontend.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use tracing::{info, instrument};

use crate::commerce::types::{CheckoutAddress, Order};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAccount, SessionCart, ShopperCredential};
use crate::models::cookies::cart_cookie;
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub confirmation_token_id: String,
    pub billing_address: CheckoutAddress,
}

/// Checkout response. The consumed cart is gone; the cart cookie already
/// points at the replacement.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    pub success_path: String,
}

/// Convert the session cart into a paid order.
///
/// Sequence, mirroring the storefront's checkout action: fetch the member
/// and account behind the account token, mint an elevated token for the
/// payment gateway, attach a confirmed payment intent, check the cart out
/// into an order, confirm the order, then delete the consumed cart and
/// point the cart cookie at a fresh one.
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    cookies: Cookies,
    ShopperCredential(credential): ShopperCredential,
    RequireAccount(account_token): RequireAccount,
    cart: SessionCart,
    Json(form): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let Some(cart_id) = cart.0 else {
        return Err(AppError::BadRequest("No cart found".to_string()));
    };

    let shopper = state.shopper();
    let bearer = credential.access_token.as_str();

    let member = shopper.account_member(bearer, &account_token).await?;
    let account = shopper.account(bearer, &account_token).await?;

    // Payment operations need the elevated client-credentials token.
    let elevated = shopper.client_credentials_token().await?;

    shopper
        .create_cart_payment_intent(
            &elevated.access_token,
            &cart_id,
            &form.confirmation_token_id,
            member.email.as_deref(),
            account.stripe_account_id.as_deref(),
        )
        .await?;

    let order = shopper
        .checkout_cart(bearer, &cart_id, &account, &member, &form.billing_address)
        .await?;

    let order = shopper.confirm_order(bearer, &order.id).await?;
    info!(order_id = %order.id, "order confirmed");

    // The old cart is consumed; replace it and re-point the cookie.
    shopper.delete_cart(bearer, &cart_id).await?;
    let fresh = shopper.create_cart(bearer).await?;
    cookies
        .signed(state.cookie_key())
        .add(cart_cookie(&fresh.id, fresh.meta.timestamps.expires_at));

    let success_path = format!("/checkout/success/{}", order.id);
    Ok(Json(CheckoutResponse {
        order,
        success_path,
    }))
}
