//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `EPCC_CLIENT_ID` - Commerce platform client identifier
//! - `EPCC_ENDPOINT_URL` - Commerce platform API base URL
//! - `STOREFRONT_COOKIE_SECRET` - Cookie signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `EPCC_CLIENT_SECRET` - Client secret; enables the client-credentials
//!   grant that checkout requires
//! - `PASSWORD_PROFILE_ID` - Authentication realm password profile; enables
//!   account login
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! Validation happens once here, at startup. Request-time code receives an
//! already-checked [`StorefrontConfig`] and never re-reads the process
//! environment.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// The signing key is derived from this secret, so it gets the same floor
/// as the key itself.
const COOKIE_SECRET_MIN_LEN: usize = 32;

/// Secrets below this Shannon entropy (bits per character) are rejected as
/// too guessable to sign cookies with.
const COOKIE_SECRET_MIN_ENTROPY: f64 = 3.3;

/// Substrings that give away a copy-pasted sample secret (case-insensitive).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "changeme",
    "placeholder",
    "example",
    "secret",
    "password",
    "your-",
    "insert",
    "todo",
    "fixme",
    "xxx",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Environment variable {0} is invalid: {1}")]
    InvalidEnvVar(String, String),
    #[error("Refusing insecure value for {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Cookie signing secret
    pub cookie_secret: SecretString,
    /// Commerce platform configuration
    pub commerce: CommerceConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Commerce platform configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// API base URL (e.g., <https://euwest.api.elasticpath.com>)
    pub endpoint_url: String,
    /// Client identifier anonymous tokens are minted for
    pub client_id: String,
    /// Client secret for the client-credentials grant (server-side only)
    pub client_secret: Option<SecretString>,
    /// Password profile used for account-member login
    pub password_profile_id: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first when one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or
    /// malformed, or if the cookie secret looks like a placeholder or has
    /// too little entropy.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = parsed_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parsed_env("STOREFRONT_PORT", "3000")?;

        let cookie_secret = required_env("STOREFRONT_COOKIE_SECRET")?;
        validate_cookie_secret(&cookie_secret, "STOREFRONT_COOKIE_SECRET")?;

        Ok(Self {
            host,
            port,
            cookie_secret: SecretString::from(cookie_secret),
            commerce: CommerceConfig::from_env()?,
            sentry_dsn: optional_env("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CommerceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint_url = required_env("EPCC_ENDPOINT_URL")?;
        url::Url::parse(&endpoint_url).map_err(|e| {
            ConfigError::InvalidEnvVar("EPCC_ENDPOINT_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            endpoint_url,
            client_id: required_env("EPCC_CLIENT_ID")?,
            client_secret: optional_env("EPCC_CLIENT_SECRET").map(SecretString::from),
            password_profile_id: optional_env("PASSWORD_PROFILE_ID"),
        })
    }
}

fn required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Read an environment variable, fall back to `default`, and parse it.
fn parsed_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Reject cookie secrets that are short, look like a sample value, or have
/// too little entropy to be a generated secret.
fn validate_cookie_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < COOKIE_SECRET_MIN_LEN {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "{} characters is below the {COOKIE_SECRET_MIN_LEN}-character minimum",
                secret.len()
            ),
        ));
    }

    let lowered = secret.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lowered.contains(*m)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("looks like a placeholder (contains '{marker}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < COOKIE_SECRET_MIN_ENTROPY {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy is {entropy:.2} bits/char, below the {COOKIE_SECRET_MIN_ENTROPY:.1} floor; generate a random secret"
            ),
        ));
    }

    Ok(())
}

/// Shannon entropy of the character distribution, in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, f64> = HashMap::new();
    let mut len = 0.0_f64;
    for c in s.chars() {
        *counts.entry(c).or_insert(0.0) += 1.0;
        len += 1.0;
    }
    if len == 0.0 {
        return 0.0;
    }

    counts
        .values()
        .map(|&count| {
            let p = count / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_of_empty_string_is_zero() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
    }

    #[test]
    fn test_entropy_of_repeated_char_is_zero() {
        assert!(shannon_entropy("ppppppp").abs() < f64::EPSILON);
    }

    #[test]
    fn test_entropy_of_even_two_char_split_is_one_bit() {
        assert!((shannon_entropy("abababab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_entropy_of_random_looking_secret_is_high() {
        assert!(shannon_entropy("kJ2#pW8$qN4!vR6@xT0%zB5^") > 3.3);
    }

    #[test]
    fn test_cookie_secret_rejects_short_value() {
        let err = validate_cookie_secret("tooshort", "COOKIE").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_cookie_secret_rejects_placeholder() {
        let err =
            validate_cookie_secret("your-cookie-signing-value-goes-here-ok", "COOKIE").unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_cookie_secret_rejects_low_entropy() {
        let err = validate_cookie_secret(&"ab".repeat(20), "COOKIE").unwrap_err();
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn test_cookie_secret_accepts_generated_value() {
        assert!(validate_cookie_secret("kJ2#pW8$qN4!vR6@xT0%zB5^mC1&dF7*", "COOKIE").is_ok());
    }

    #[test]
    fn test_socket_addr_combines_host_and_port() {
        let config = StorefrontConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 8088,
            cookie_secret: SecretString::from("x".repeat(32)),
            commerce: CommerceConfig {
                endpoint_url: "https://euwest.api.elasticpath.com".to_string(),
                client_id: "client-1".to_string(),
                client_secret: None,
                password_profile_id: None,
            },
            sentry_dsn: None,
        };

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8088");
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let config = CommerceConfig {
            endpoint_url: "https://euwest.api.elasticpath.com".to_string(),
            client_id: "visible-client-id".to_string(),
            client_secret: Some(SecretString::from("never-printed-value")),
            password_profile_id: Some("profile-1".to_string()),
        };

        let rendered = format!("{config:?}");
        assert!(rendered.contains("visible-client-id"));
        assert!(rendered.contains("profile-1"));
        assert!(!rendered.contains("never-printed-value"));
    }
}
