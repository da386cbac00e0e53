//! Commerce platform shopper client implementation.
//!
//! Thin REST client over `reqwest`. Every call is made with an explicit
//! bearer token because tokens live in request cookies, not in the client;
//! the client itself holds only endpoint configuration and a catalog cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use paper_parrot_core::{AccountMemberCredential, CartId, CartItemId, OrderId, ProductId};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::commerce::CommerceError;
use crate::commerce::types::{
    AccessTokenResponse, Account, AccountMember, Cart, CartItem, CheckoutAddress, Order, Product,
    Transaction,
};
use crate::config::CommerceConfig;
use crate::services::bootstrap::BootstrapCommerce;

/// Header carrying the account-member authentication token.
const ACCOUNT_AUTH_HEADER: &str = "EP-Account-Management-Authentication-Token";

/// Bounded deadline for every upstream call. The platform is fast or down;
/// a request must never hang a storefront worker indefinitely.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog cache TTL.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// JSON:API response envelope.
#[derive(Debug, Deserialize)]
struct Document<T> {
    data: T,
}

// =============================================================================
// ShopperClient
// =============================================================================

/// Client for the commerce platform's shopper-facing APIs.
///
/// Cheaply cloneable; catalog reads are cached for 5 minutes.
#[derive(Clone)]
pub struct ShopperClient {
    inner: Arc<ShopperClientInner>,
}

struct ShopperClientInner {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: Option<String>,
    password_profile_id: Option<String>,
    catalog: Cache<String, Arc<Vec<Product>>>,
}

impl ShopperClient {
    /// Create a new shopper client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &CommerceConfig) -> Result<Self, CommerceError> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;

        let catalog = Cache::builder()
            .max_capacity(100)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ShopperClientInner {
                http,
                base_url: config.endpoint_url.trim_end_matches('/').to_string(),
                client_id: config.client_id.clone(),
                client_secret: config
                    .client_secret
                    .as_ref()
                    .map(|s| s.expose_secret().to_string()),
                password_profile_id: config.password_profile_id.clone(),
                catalog,
            }),
        })
    }

    /// The client identifier tokens are minted for.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Read a response body, mapping non-success statuses and malformed
    /// JSON to errors. Parses from text so failures carry the body.
    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CommerceError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let document: Document<T> = serde_json::from_str(&text)?;
        Ok(document.data)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tokens
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint an access token via the implicit grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or returns no usable data.
    #[instrument(skip(self))]
    pub async fn implicit_token(&self) -> Result<AccessTokenResponse, CommerceError> {
        self.access_token(&[
            ("grant_type", "implicit"),
            ("client_id", &self.inner.client_id),
        ])
        .await
    }

    /// Mint an access token via the client-credentials grant.
    ///
    /// Requires the client secret to be configured; checkout uses this
    /// elevated token for payment and order operations.
    ///
    /// # Errors
    ///
    /// Returns an error if no client secret is configured or the call fails.
    #[instrument(skip(self))]
    pub async fn client_credentials_token(&self) -> Result<AccessTokenResponse, CommerceError> {
        let Some(secret) = self.inner.client_secret.as_deref() else {
            return Err(CommerceError::NotConfigured("client secret"));
        };

        self.access_token(&[
            ("grant_type", "client_credentials"),
            ("client_id", &self.inner.client_id),
            ("client_secret", secret),
        ])
        .await
    }

    async fn access_token(
        &self,
        params: &[(&str, &str)],
    ) -> Result<AccessTokenResponse, CommerceError> {
        let response = self
            .inner
            .http
            .post(self.url("/oauth/access_token"))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // The token endpoint is the one surface that answers without a
        // data envelope.
        let token: AccessTokenResponse = serde_json::from_str(&response.text().await?)?;
        if token.access_token.is_empty() {
            return Err(CommerceError::MissingData("access token"));
        }
        Ok(token)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Carts
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, bearer))]
    pub async fn create_cart(&self, bearer: &str) -> Result<Cart, CommerceError> {
        let body = serde_json::json!({ "data": { "name": "Cart" } });

        let response = self
            .inner
            .http
            .post(self.url("/v2/carts"))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await?;

        let cart: Cart = Self::parse(response).await?;
        debug!(cart_id = %cart.id, "created cart");
        Ok(cart)
    }

    /// Fetch a cart together with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the cart does not exist.
    #[instrument(skip(self, bearer))]
    pub async fn get_cart(
        &self,
        bearer: &str,
        cart_id: &CartId,
    ) -> Result<(Cart, Vec<CartItem>), CommerceError> {
        #[derive(Deserialize)]
        struct Included {
            #[serde(default)]
            items: Vec<CartItem>,
        }

        #[derive(Deserialize)]
        struct CartDocument {
            data: Cart,
            #[serde(default)]
            included: Option<Included>,
        }

        let response = self
            .inner
            .http
            .get(self.url(&format!("/v2/carts/{cart_id}")))
            .query(&[("include", "items")])
            .bearer_auth(bearer)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let document: CartDocument = serde_json::from_str(&response.text().await?)?;
        let items = document.included.map(|i| i.items).unwrap_or_default();
        Ok((document.data, items))
    }

    /// Delete a cart, usually after checkout has consumed it.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, bearer))]
    pub async fn delete_cart(&self, bearer: &str, cart_id: &CartId) -> Result<(), CommerceError> {
        let response = self
            .inner
            .http
            .delete(self.url(&format!("/v2/carts/{cart_id}")))
            .bearer_auth(bearer)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Add a product to a cart. Returns the cart's full item list.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, bearer))]
    pub async fn add_product_to_cart(
        &self,
        bearer: &str,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Vec<CartItem>, CommerceError> {
        let body = serde_json::json!({
            "data": {
                "type": "cart_item",
                "id": product_id,
                "quantity": quantity,
            }
        });

        self.post_cart_items(bearer, cart_id, &body).await
    }

    /// Add a subscription item to a cart. Returns the cart's full item list.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, bearer))]
    pub async fn add_subscription_to_cart(
        &self,
        bearer: &str,
        cart_id: &CartId,
        offering_id: &str,
        plan_id: &str,
        pricing_option_id: &str,
    ) -> Result<Vec<CartItem>, CommerceError> {
        let body = serde_json::json!({
            "data": {
                "type": "subscription_item",
                "id": offering_id,
                "quantity": 1,
                "subscription_configuration": {
                    "plan": plan_id,
                    "pricing_option": pricing_option_id,
                }
            }
        });

        self.post_cart_items(bearer, cart_id, &body).await
    }

    async fn post_cart_items(
        &self,
        bearer: &str,
        cart_id: &CartId,
        body: &serde_json::Value,
    ) -> Result<Vec<CartItem>, CommerceError> {
        let response = self
            .inner
            .http
            .post(self.url(&format!("/v2/carts/{cart_id}/items")))
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Remove an item from a cart. Returns the remaining item list.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, bearer))]
    pub async fn remove_cart_item(
        &self,
        bearer: &str,
        cart_id: &CartId,
        item_id: &CartItemId,
    ) -> Result<Vec<CartItem>, CommerceError> {
        let response = self
            .inner
            .http
            .delete(self.url(&format!("/v2/carts/{cart_id}/items/{item_id}")))
            .bearer_auth(bearer)
            .send()
            .await?;

        Self::parse(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────

    /// List catalog products, cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails on a cache miss.
    #[instrument(skip(self, bearer))]
    pub async fn products(&self, bearer: &str) -> Result<Arc<Vec<Product>>, CommerceError> {
        if let Some(cached) = self.inner.catalog.get("products").await {
            debug!("catalog cache hit");
            return Ok(cached);
        }

        let response = self
            .inner
            .http
            .get(self.url("/catalog/products"))
            .bearer_auth(bearer)
            .send()
            .await?;

        let products: Vec<Product> = Self::parse(response).await?;
        let products = Arc::new(products);
        self.inner
            .catalog
            .insert("products".to_string(), Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// Fetch a single catalog product.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the product does not exist.
    #[instrument(skip(self, bearer))]
    pub async fn product(
        &self,
        bearer: &str,
        product_id: &ProductId,
    ) -> Result<Product, CommerceError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("/catalog/products/{product_id}")))
            .bearer_auth(bearer)
            .send()
            .await?;

        Self::parse(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accounts
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue an account-member token via the password grant.
    ///
    /// # Errors
    ///
    /// Returns an error if no password profile is configured, the call
    /// fails, or the response carries no token.
    #[instrument(skip(self, bearer, password))]
    pub async fn account_member_token(
        &self,
        bearer: &str,
        username: &str,
        password: &str,
    ) -> Result<AccountMemberCredential, CommerceError> {
        let Some(profile_id) = self.inner.password_profile_id.as_deref() else {
            return Err(CommerceError::NotConfigured("password profile"));
        };

        let body = serde_json::json!({
            "data": {
                "type": "account_management_authentication_token",
                "authentication_mechanism": "password",
                "password_profile_id": profile_id,
                "username": username,
                "password": password,
            }
        });

        let response = self
            .inner
            .http
            .post(self.url("/v2/account-members/tokens"))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await?;

        let tokens: Vec<AccountMemberCredential> = Self::parse(response).await?;
        tokens
            .into_iter()
            .next()
            .ok_or(CommerceError::MissingData("account member token"))
    }

    /// Fetch the account member behind an account token.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or no member is visible.
    #[instrument(skip(self, bearer, account_token))]
    pub async fn account_member(
        &self,
        bearer: &str,
        account_token: &str,
    ) -> Result<AccountMember, CommerceError> {
        let response = self
            .inner
            .http
            .get(self.url("/v2/account-members"))
            .bearer_auth(bearer)
            .header(ACCOUNT_AUTH_HEADER, account_token)
            .send()
            .await?;

        let members: Vec<AccountMember> = Self::parse(response).await?;
        members
            .into_iter()
            .next()
            .ok_or(CommerceError::MissingData("account member"))
    }

    /// Fetch the account visible to an account token.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or no account is visible.
    #[instrument(skip(self, bearer, account_token))]
    pub async fn account(
        &self,
        bearer: &str,
        account_token: &str,
    ) -> Result<Account, CommerceError> {
        let response = self
            .inner
            .http
            .get(self.url("/v2/accounts"))
            .bearer_auth(bearer)
            .header(ACCOUNT_AUTH_HEADER, account_token)
            .send()
            .await?;

        let accounts: Vec<Account> = Self::parse(response).await?;
        accounts
            .into_iter()
            .next()
            .ok_or(CommerceError::MissingData("account"))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach a confirmed payment intent to a cart.
    ///
    /// The confirmation token comes from the payment-elements frontend;
    /// the gateway and processor do the actual capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip_all, fields(cart_id = %cart_id))]
    pub async fn create_cart_payment_intent(
        &self,
        bearer: &str,
        cart_id: &CartId,
        confirmation_token_id: &str,
        receipt_email: Option<&str>,
        payment_customer_id: Option<&str>,
    ) -> Result<Transaction, CommerceError> {
        let body = serde_json::json!({
            "data": {
                "gateway": "elastic_path_payments_stripe",
                "method": "purchase",
                "options": {
                    "automatic_payment_methods": { "enabled": true },
                    "confirm": true,
                    "confirmation_token": confirmation_token_id,
                    "receipt_email": receipt_email,
                    "customer": payment_customer_id,
                    // Redirect-based payment methods are not handled here.
                    "return_url": "https://placeholder.com",
                    "setup_future_usage": "off_session",
                }
            }
        });

        let response = self
            .inner
            .http
            .post(self.url(&format!("/v2/carts/{cart_id}/payments")))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Convert a cart into an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip_all, fields(cart_id = %cart_id))]
    pub async fn checkout_cart(
        &self,
        bearer: &str,
        cart_id: &CartId,
        account: &Account,
        member: &AccountMember,
        billing_address: &CheckoutAddress,
    ) -> Result<Order, CommerceError> {
        let address = serde_json::json!({
            "first_name": billing_address.first_name,
            "last_name": billing_address.last_name,
            "line_1": billing_address.line_1,
            "line_2": billing_address.line_2.clone().unwrap_or_default(),
            "city": billing_address.city,
            "region": billing_address.region.clone().unwrap_or_default(),
            "postcode": billing_address.postcode,
            "country": billing_address.country,
            "company_name": "",
            "county": "",
        });

        let mut shipping = address.clone();
        if let Some(shipping) = shipping.as_object_mut() {
            shipping.insert("phone_number".to_string(), serde_json::json!(""));
            shipping.insert("instructions".to_string(), serde_json::json!(""));
        }

        let body = serde_json::json!({
            "data": {
                "account": {
                    "id": account.id,
                    "member_id": member.id,
                },
                "contact": {
                    "email": member.email,
                    "name": member.name,
                },
                "billing_address": address,
                "shipping_address": shipping,
            }
        });

        let response = self
            .inner
            .http
            .post(self.url(&format!("/v2/carts/{cart_id}/checkout")))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Confirm a paid order with the payment gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, bearer))]
    pub async fn confirm_order(
        &self,
        bearer: &str,
        order_id: &OrderId,
    ) -> Result<Order, CommerceError> {
        let body = serde_json::json!({
            "data": {
                "options": {
                    "metadata": {
                        "order_id": order_id,
                        "statement_descriptor": "Confirmed intent",
                    }
                }
            }
        });

        let response = self
            .inner
            .http
            .post(self.url(&format!("/v2/orders/{order_id}/confirm")))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await?;

        Self::parse(response).await
    }
}

impl BootstrapCommerce for ShopperClient {
    async fn mint_anonymous_token(&self) -> Result<AccessTokenResponse, CommerceError> {
        self.implicit_token().await
    }

    async fn create_session_cart(&self, bearer: &str) -> Result<Cart, CommerceError> {
        self.create_cart(bearer).await
    }
}
