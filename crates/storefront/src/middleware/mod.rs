//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Cookie manager (tower-cookies, signed jar)
//! 6. Session gate (page routes only: credential + cart bootstrap)

pub mod account;
pub mod request_id;
pub mod security_headers;
pub mod session_gate;
pub mod shopper;

pub use account::RequireAccount;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session_gate::{ERROR_MESSAGE_HEADER, session_gate_middleware};
pub use shopper::{SessionCart, ShopperCredential};
