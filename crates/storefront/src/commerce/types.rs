//! Typed views of commerce platform resources.
//!
//! The platform speaks a JSON:API dialect: every response wraps its payload
//! in a `data` member, and resource metadata (timestamps, display prices)
//! lives under `meta`. Only the fields the storefront actually reads are
//! modelled; unknown fields are ignored on deserialization.

use chrono::{DateTime, Utc};
use paper_parrot_core::{AccountId, AccountMemberId, CartId, CartItemId, OrderId, ProductId};
use serde::{Deserialize, Serialize};

/// Response of the access-token endpoint, for any grant type.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    /// Opaque bearer token.
    pub access_token: String,
    /// Reported token type (`"Bearer"`).
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// Absolute expiry in epoch seconds.
    pub expires: i64,
    /// Grant identifier (`"implicit"` or `"client_credentials"`).
    pub identifier: String,
}

/// A shopping cart resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub meta: CartMeta,
}

/// Cart metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartMeta {
    pub timestamps: CartTimestamps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_price: Option<DisplayPrice>,
}

/// Cart lifecycle timestamps. The expiry drives the cart cookie's own
/// expiry, so it is the one field that must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartTimestamps {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

/// A line in a cart: either a product item or a subscription item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Option<Price>,
}

/// A monetary amount in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub includes_tax: Option<bool>,
}

/// Formatted display prices, as the platform renders them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayPrice {
    #[serde(default)]
    pub with_tax: Option<PriceView>,
    #[serde(default)]
    pub without_tax: Option<PriceView>,
}

/// One rendered price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceView {
    pub amount: i64,
    pub currency: String,
    pub formatted: String,
}

/// A catalog product, as the shopper catalog endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub attributes: ProductAttributes,
    #[serde(default)]
    pub meta: Option<ProductMeta>,
}

/// Catalog product attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductAttributes {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Catalog product metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductMeta {
    #[serde(default)]
    pub display_price: Option<DisplayPrice>,
}

/// An account visible to the authenticated member.
///
/// The payment-provider customer reference is a custom field the original
/// store stamps onto accounts at registration time.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: Option<String>,
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default, rename = "stripe-account-id")]
    pub stripe_account_id: Option<String>,
}

/// An account member (the person behind the login).
#[derive(Debug, Clone, Deserialize)]
pub struct AccountMember {
    pub id: AccountMemberId,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// An order produced by checking out a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: String,
    #[serde(default)]
    pub payment: Option<String>,
    #[serde(default)]
    pub shipping: Option<String>,
}

/// A payment transaction recorded against a cart or order.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
}

/// Billing/shipping address fields for checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutAddress {
    pub first_name: String,
    pub last_name: String,
    pub line_1: String,
    #[serde(default)]
    pub line_2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
    pub postcode: String,
    pub country: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_response_parses() {
        let json = r#"{
            "access_token": "tok1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "expires": 1893456000,
            "identifier": "implicit"
        }"#;
        let token: AccessTokenResponse = serde_json::from_str(json).expect("parses");
        assert_eq!(token.access_token, "tok1");
        assert_eq!(token.expires, 1_893_456_000);
        assert_eq!(token.identifier, "implicit");
    }

    #[test]
    fn test_cart_parses_with_expiry() {
        let json = r#"{
            "id": "cart-456",
            "type": "cart",
            "name": "Cart",
            "description": "",
            "meta": {
                "timestamps": {
                    "created_at": "2026-01-01T10:00:00Z",
                    "updated_at": "2026-01-01T10:00:00Z",
                    "expires_at": "2026-01-08T10:00:00Z"
                }
            }
        }"#;
        let cart: Cart = serde_json::from_str(json).expect("parses");
        assert_eq!(cart.id.as_str(), "cart-456");
        assert_eq!(
            cart.meta.timestamps.expires_at.to_rfc3339(),
            "2026-01-08T10:00:00+00:00"
        );
    }

    #[test]
    fn test_cart_item_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": "item-1",
            "type": "cart_item",
            "name": "Birthday Llama",
            "quantity": 2
        }"#;
        let item: CartItem = serde_json::from_str(json).expect("parses");
        assert_eq!(item.quantity, 2);
        assert!(item.product_id.is_none());
        assert!(item.unit_price.is_none());
    }

    #[test]
    fn test_product_display_price() {
        let json = r#"{
            "id": "prod-1",
            "type": "product",
            "attributes": {
                "name": "Birthday Llama",
                "sku": "card-001",
                "slug": "birthday-llama"
            },
            "meta": {
                "display_price": {
                    "without_tax": {
                        "amount": 450,
                        "currency": "GBP",
                        "formatted": "£4.50"
                    }
                }
            }
        }"#;
        let product: Product = serde_json::from_str(json).expect("parses");
        let price = product
            .meta
            .and_then(|m| m.display_price)
            .and_then(|p| p.without_tax)
            .expect("has price");
        assert_eq!(price.formatted, "£4.50");
    }

    #[test]
    fn test_account_custom_payment_field() {
        let json = r#"{
            "id": "acc-1",
            "type": "account",
            "name": "Jo Bloggs",
            "stripe-account-id": "cus_123"
        }"#;
        let account: Account = serde_json::from_str(json).expect("parses");
        assert_eq!(account.stripe_account_id.as_deref(), Some("cus_123"));
    }
}
