//! Card catalog route handlers.
//!
//! Cards are catalog products on the commerce platform; these handlers
//! render them as JSON summaries.

use axum::{
    Json,
    extract::{Path, State},
};
use paper_parrot_core::ProductId;
use serde::Serialize;
use tracing::instrument;

use crate::commerce::CommerceError;
use crate::commerce::types::Product;
use crate::error::{AppError, Result};
use crate::middleware::ShopperCredential;
use crate::state::AppState;

/// Card display data.
#[derive(Debug, Serialize)]
pub struct CardView {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
}

impl From<&Product> for CardView {
    fn from(product: &Product) -> Self {
        let price = product.meta.as_ref().and_then(|meta| {
            let display = meta.display_price.as_ref()?;
            display
                .with_tax
                .as_ref()
                .or(display.without_tax.as_ref())
                .map(|p| p.formatted.clone())
        });

        Self {
            id: product.id.clone(),
            name: product.attributes.name.clone(),
            sku: product.attributes.sku.clone(),
            slug: product.attributes.slug.clone(),
            description: product.attributes.description.clone(),
            price,
        }
    }
}

/// List all cards in the catalog.
#[instrument(skip(state, credential))]
pub async fn index(
    State(state): State<AppState>,
    ShopperCredential(credential): ShopperCredential,
) -> Result<Json<Vec<CardView>>> {
    let products = state.shopper().products(&credential.access_token).await?;
    Ok(Json(products.iter().map(CardView::from).collect()))
}

/// Show a single card.
#[instrument(skip(state, credential))]
pub async fn show(
    State(state): State<AppState>,
    ShopperCredential(credential): ShopperCredential,
    Path(id): Path<ProductId>,
) -> Result<Json<CardView>> {
    let product = state
        .shopper()
        .product(&credential.access_token, &id)
        .await
        .map_err(|err| match err {
            CommerceError::Api { status: 404, .. } => AppError::NotFound(format!("card {id}")),
            other => AppError::from(other),
        })?;

    Ok(Json(CardView::from(&product)))
}
