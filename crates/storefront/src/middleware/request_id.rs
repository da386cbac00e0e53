//! Request correlation IDs.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

/// Header the correlation ID travels in, both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Stamp every request with a correlation ID.
///
/// An ID arriving from a fronting proxy is kept; without one a fresh
/// UUID v4 is assigned. The ID is tagged onto the Sentry scope so errors
/// from this request can be matched to the log line, and echoed back in
/// the response so the client can quote it.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &id);
    });

    let mut response = next.run(request).await;

    if let Ok(echoed) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, echoed);
    }

    response
}
