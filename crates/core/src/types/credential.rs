//! Credential records held in session cookies.
//!
//! Both tokens are minted by the commerce platform and stored client-side;
//! the server keeps no session state of its own. The anonymous credential
//! scopes unauthenticated storefront traffic, the account-member credential
//! scopes a logged-in customer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anonymous bearer credential for storefront API traffic.
///
/// Serialized as the JSON value of the credentials cookie. Mirrors the
/// token-mint response of the implicit grant, plus the `client_id` the
/// token was minted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousCredential {
    /// Opaque bearer token.
    pub access_token: String,
    /// Token type reported by the platform (`"Bearer"`).
    pub token_type: String,
    /// Absolute expiry in epoch seconds.
    pub expires: i64,
    /// Lifetime in seconds at mint time.
    pub expires_in: i64,
    /// Grant identifier (`"implicit"`).
    pub identifier: String,
    /// Client the token was minted for.
    pub client_id: String,
}

impl AnonymousCredential {
    /// Whether the credential has expired at the given instant.
    ///
    /// A credential is only usable while its expiry is strictly in the
    /// future; an expiry equal to `now` counts as expired.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now.timestamp()
    }

    /// Expiry as a UTC timestamp, if it is representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires, 0)
    }
}

/// Account-member authentication token for a logged-in customer.
///
/// Issued by the account-member token endpoint (password grant) and held
/// in its own cookie. Sent upstream via the account management
/// authentication header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMemberCredential {
    /// Account the member authenticated into.
    pub account_id: String,
    /// Display name of that account.
    pub account_name: String,
    /// Opaque authentication token.
    pub token: String,
    /// Absolute expiry.
    pub expires: DateTime<Utc>,
    /// Discriminator reported by the platform
    /// (`"account_management_authentication_token"`).
    #[serde(rename = "type")]
    pub kind: String,
}

impl AccountMemberCredential {
    /// Whether the token has expired at the given instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}
