//! Cart route handlers.
//!
//! The cart itself lives on the commerce platform; the cart cookie only
//! names it. Handlers here resolve the cookie and delegate.

use axum::{
    Json,
    extract::{Path, State},
};
use paper_parrot_core::{CartItemId, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::commerce::types::{Cart, CartItem};
use crate::error::Result;
use crate::middleware::{SessionCart, ShopperCredential};
use crate::state::AppState;

/// Cart with its items, as returned to the client.
#[derive(Debug, Serialize)]
pub struct CartContents {
    pub cart: Cart,
    pub items: Vec<CartItem>,
}

/// Item list response for mutations.
#[derive(Debug, Serialize)]
pub struct CartItems {
    pub items: Vec<CartItem>,
}

/// Add-product form data.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: Option<i64>,
}

/// Add-subscription form data.
#[derive(Debug, Deserialize)]
pub struct AddSubscriptionRequest {
    pub offering_id: String,
    pub plan_id: String,
    pub pricing_option_id: String,
}

/// Fetch the session cart with its items.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    ShopperCredential(credential): ShopperCredential,
    cart: SessionCart,
) -> Result<Json<CartContents>> {
    let cart_id = cart.required()?;
    let (cart, items) = state
        .shopper()
        .get_cart(&credential.access_token, &cart_id)
        .await?;

    Ok(Json(CartContents { cart, items }))
}

/// Add a product to the session cart.
#[instrument(skip_all, fields(product_id = %form.product_id))]
pub async fn add_item(
    State(state): State<AppState>,
    ShopperCredential(credential): ShopperCredential,
    cart: SessionCart,
    Json(form): Json<AddItemRequest>,
) -> Result<Json<CartItems>> {
    let cart_id = cart.required()?;
    let items = state
        .shopper()
        .add_product_to_cart(
            &credential.access_token,
            &cart_id,
            &form.product_id,
            form.quantity.unwrap_or(1),
        )
        .await?;

    Ok(Json(CartItems { items }))
}

/// Add a subscription item to the session cart.
#[instrument(skip_all, fields(offering_id = %form.offering_id))]
pub async fn add_subscription_item(
    State(state): State<AppState>,
    ShopperCredential(credential): ShopperCredential,
    cart: SessionCart,
    Json(form): Json<AddSubscriptionRequest>,
) -> Result<Json<CartItems>> {
    let cart_id = cart.required()?;
    let items = state
        .shopper()
        .add_subscription_to_cart(
            &credential.access_token,
            &cart_id,
            &form.offering_id,
            &form.plan_id,
            &form.pricing_option_id,
        )
        .await?;

    Ok(Json(CartItems { items }))
}

/// Remove an item from the session cart.
#[instrument(skip_all, fields(item_id = %item_id))]
pub async fn remove_item(
    State(state): State<AppState>,
    ShopperCredential(credential): ShopperCredential,
    cart: SessionCart,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<CartItems>> {
    let cart_id = cart.required()?;
    let items = state
        .shopper()
        .remove_cart_item(&credential.access_token, &cart_id, &item_id)
        .await?;

    Ok(Json(CartItems { items }))
}
