//! Shared test harness: a fake commerce platform and cookie helpers.
//!
//! The fake platform binds an ephemeral port and records every call the
//! storefront makes, so tests can assert exactly which upstream operations
//! a given cookie state triggers.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::json;
use tower_cookies::Key;
use tower_cookies::cookie::{Cookie, CookieJar};

use paper_parrot_storefront::config::{CommerceConfig, StorefrontConfig};
use paper_parrot_storefront::routes;
use paper_parrot_storefront::state::AppState;

/// Signing secret used by every test app.
pub const COOKIE_SIGNING_KEY: &str = "0f8b2c4d6e8a0b2c4d6e8f0a1b3c5d7e9f1a3b5c";

/// Call log of the fake platform.
#[derive(Clone, Default)]
pub struct PlatformCalls {
    pub token_mints: Arc<AtomicUsize>,
    pub cart_creates: Arc<AtomicUsize>,
    pub cart_deletes: Arc<AtomicUsize>,
    pub fail_token_mint: Arc<AtomicBool>,
    pub fail_cart_create: Arc<AtomicBool>,
    /// Authorization headers seen by the cart-create endpoint.
    pub cart_create_bearers: Arc<Mutex<Vec<String>>>,
    /// Grant types seen by the token endpoint.
    pub grants: Arc<Mutex<Vec<String>>>,
}

impl PlatformCalls {
    pub fn token_mints(&self) -> usize {
        self.token_mints.load(Ordering::SeqCst)
    }

    pub fn cart_creates(&self) -> usize {
        self.cart_creates.load(Ordering::SeqCst)
    }

    pub fn cart_deletes(&self) -> usize {
        self.cart_deletes.load(Ordering::SeqCst)
    }

    pub fn cart_create_bearers(&self) -> Vec<String> {
        self.cart_create_bearers
            .lock()
            .expect("lock poisoned")
            .clone()
    }
}

/// A running fake platform.
pub struct FakePlatform {
    pub base_url: String,
    pub calls: PlatformCalls,
}

/// Spawn the fake commerce platform on an ephemeral port.
pub async fn spawn_platform() -> FakePlatform {
    let calls = PlatformCalls::default();

    let router = Router::new()
        .route("/oauth/access_token", post(access_token))
        .route("/v2/carts", post(create_cart))
        .route("/v2/carts/{id}", get(get_cart).delete(delete_cart))
        .route("/v2/carts/{id}/items", post(add_cart_item))
        .route(
            "/v2/carts/{id}/items/{item_id}",
            axum::routing::delete(remove_cart_item),
        )
        .route("/v2/carts/{id}/payments", post(create_payment))
        .route("/v2/carts/{id}/checkout", post(checkout_cart))
        .route("/v2/orders/{id}/confirm", post(confirm_order))
        .route("/v2/account-members/tokens", post(member_tokens))
        .route("/v2/account-members", get(account_members))
        .route("/v2/accounts", get(accounts))
        .route("/catalog/products", get(catalog_products))
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake platform");
    });

    FakePlatform {
        base_url: format!("http://{addr}"),
        calls,
    }
}

async fn access_token(
    State(calls): State<PlatformCalls>,
    Form(params): Form<std::collections::HashMap<String, String>>,
) -> Response {
    calls.token_mints.fetch_add(1, Ordering::SeqCst);

    let grant = params.get("grant_type").cloned().unwrap_or_default();
    calls.grants.lock().expect("lock poisoned").push(grant.clone());

    if calls.fail_token_mint.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let access_token = if grant == "client_credentials" {
        "tok-cc"
    } else {
        "tok1"
    };
    let now = Utc::now().timestamp();
    Json(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
        "expires": now + 3600,
        "identifier": grant,
    }))
    .into_response()
}

fn cart_json(id: &str) -> serde_json::Value {
    let now = Utc::now();
    json!({
        "id": id,
        "type": "cart",
        "name": "Cart",
        "description": "",
        "meta": {
            "timestamps": {
                "created_at": now.to_rfc3339(),
                "updated_at": now.to_rfc3339(),
                "expires_at": (now + Duration::days(7)).to_rfc3339(),
            }
        }
    })
}

async fn create_cart(State(calls): State<PlatformCalls>, headers: HeaderMap) -> Response {
    let count = calls.cart_creates.fetch_add(1, Ordering::SeqCst);

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    calls
        .cart_create_bearers
        .lock()
        .expect("lock poisoned")
        .push(bearer);

    if calls.fail_cart_create.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    // First cart of a test is cart-456; any replacement is cart-789.
    let id = if count == 0 { "cart-456" } else { "cart-789" };
    Json(json!({ "data": cart_json(id) })).into_response()
}

async fn get_cart(Path(id): Path<String>) -> Response {
    Json(json!({
        "data": cart_json(&id),
        "included": {
            "items": [{
                "id": "item-1",
                "type": "cart_item",
                "product_id": "prod-1",
                "name": "Birthday Llama",
                "sku": "card-001",
                "quantity": 2,
                "unit_price": { "amount": 450, "currency": "GBP", "includes_tax": true }
            }]
        }
    }))
    .into_response()
}

async fn delete_cart(State(calls): State<PlatformCalls>) -> StatusCode {
    calls.cart_deletes.fetch_add(1, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn add_cart_item(Json(body): Json<serde_json::Value>) -> Response {
    let quantity = body
        .pointer("/data/quantity")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(1);
    let product = body
        .pointer("/data/id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();

    Json(json!({
        "data": [{
            "id": "item-1",
            "type": "cart_item",
            "product_id": product,
            "name": "Birthday Llama",
            "sku": "card-001",
            "quantity": quantity,
            "unit_price": { "amount": 450, "currency": "GBP", "includes_tax": true }
        }]
    }))
    .into_response()
}

async fn remove_cart_item() -> Response {
    Json(json!({ "data": [] })).into_response()
}

async fn create_payment() -> Response {
    Json(json!({
        "data": { "id": "txn-1", "status": "complete", "gateway": "elastic_path_payments_stripe" }
    }))
    .into_response()
}

async fn checkout_cart() -> Response {
    Json(json!({
        "data": { "id": "order-1", "type": "order", "status": "complete", "payment": "paid" }
    }))
    .into_response()
}

async fn confirm_order(Path(id): Path<String>) -> Response {
    Json(json!({
        "data": { "id": id, "type": "order", "status": "complete", "payment": "paid" }
    }))
    .into_response()
}

async fn member_tokens() -> Response {
    Json(json!({
        "data": [{
            "type": "account_management_authentication_token",
            "account_id": "acc-1",
            "account_name": "Jo Bloggs",
            "token": "acct-tok",
            "expires": (Utc::now() + Duration::days(1)).to_rfc3339(),
        }],
        "meta": { "activated_account_id": "acc-1" }
    }))
    .into_response()
}

async fn account_members() -> Response {
    Json(json!({
        "data": [{ "id": "mem-1", "email": "jo@example.com", "name": "Jo Bloggs" }]
    }))
    .into_response()
}

async fn accounts() -> Response {
    Json(json!({
        "data": [{ "id": "acc-1", "name": "Jo Bloggs", "stripe-account-id": "cus_1" }]
    }))
    .into_response()
}

async fn catalog_products() -> Response {
    Json(json!({
        "data": [{
            "id": "prod-1",
            "type": "product",
            "attributes": {
                "name": "Birthday Llama",
                "sku": "card-001",
                "slug": "birthday-llama",
                "description": "A llama. A party hat. What more do you need.",
                "status": "live"
            },
            "meta": {
                "display_price": {
                    "without_tax": { "amount": 450, "currency": "GBP", "formatted": "£4.50" }
                }
            }
        }]
    }))
    .into_response()
}

// =============================================================================
// App construction
// =============================================================================

/// Build the storefront app pointed at the fake platform.
pub fn storefront_app(base_url: &str, client_id: &str) -> Router {
    let config = StorefrontConfig {
        host: "127.0.0.1".parse().expect("valid host"),
        port: 0,
        cookie_secret: SecretString::from(COOKIE_SIGNING_KEY),
        commerce: CommerceConfig {
            endpoint_url: base_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: Some(SecretString::from("cc-9f1a3b5c7d9e1f3a5b7c9d1e3f5a7b9c")),
            password_profile_id: Some("profile-1".to_string()),
        },
        sentry_dsn: None,
    };

    let state = AppState::new(config).expect("app state");
    routes::router(state)
}

// =============================================================================
// Cookie helpers
// =============================================================================

/// The signing key every test app derives from [`COOKIE_SIGNING_KEY`].
pub fn signing_key() -> Key {
    Key::derive_from(COOKIE_SIGNING_KEY.as_bytes())
}

/// Build a `name=value` pair for the request `Cookie` header, signed the
/// way the app's jar signs it.
pub fn signed_pair(name: &str, value: &str) -> String {
    let mut jar = CookieJar::new();
    jar.signed_mut(&signing_key())
        .add(Cookie::new(name.to_owned(), value.to_owned()));
    let cookie = jar.get(name).expect("cookie was added");
    cookie.encoded().to_string()
}

/// Parse all `Set-Cookie` headers of a response.
pub fn response_cookies(response: &Response) -> Vec<Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|s| Cookie::parse_encoded(s.to_owned()).ok())
        .collect()
}

/// Verify a response cookie's signature and return its plain value.
pub fn verified_value(cookie: &Cookie<'static>) -> Option<String> {
    let mut jar = CookieJar::new();
    jar.add_original(cookie.clone());
    jar.signed(&signing_key())
        .get(cookie.name())
        .map(|c| c.value().to_string())
}

/// A well-formed credential cookie value with the given expiry.
pub fn credential_json(access_token: &str, expires: i64) -> String {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires": expires,
        "expires_in": 3600,
        "identifier": "implicit",
        "client_id": "client-1",
    })
    .to_string()
}
