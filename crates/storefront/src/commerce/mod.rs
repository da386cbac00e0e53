//! Commerce platform API client.
//!
//! # Architecture
//!
//! - The commerce platform is the source of truth - NO local sync, direct
//!   REST calls with `reqwest`
//! - Anonymous and account credentials travel in signed cookies, never in
//!   server-side state
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL)
//!
//! # APIs
//!
//! ## Shopper surface
//! - Token minting (implicit and client-credentials grants)
//! - Carts: create, fetch (with items), delete, item add/remove
//! - Catalog product listing
//!
//! ## Account surface
//! - Account-member token issuance (password grant)
//! - Account and member lookup for checkout

mod shopper;
pub mod types;

pub use shopper::ShopperClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce platform.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder when unreadable.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response was well-formed but carried no usable data.
    #[error("No data in response: {0}")]
    MissingData(&'static str),

    /// The operation needs configuration that was not provided.
    #[error("Not configured: {0}")]
    NotConfigured(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = CommerceError::Api {
            status: 403,
            message: "access denied".to_string(),
        };
        assert_eq!(err.to_string(), "API error (403): access denied");
    }

    #[test]
    fn test_missing_data_display() {
        let err = CommerceError::MissingData("access token");
        assert_eq!(err.to_string(), "No data in response: access token");
    }

    #[test]
    fn test_not_configured_display() {
        let err = CommerceError::NotConfigured("EPCC_CLIENT_SECRET");
        assert_eq!(err.to_string(), "Not configured: EPCC_CLIENT_SECRET");
    }
}
