//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Ways an email address can fail to parse.
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    #[error("email address is empty")]
    Empty,
    #[error("email address exceeds {0} characters")]
    TooLong(usize),
    #[error("email address has no @ separator")]
    MissingAtSymbol,
    #[error("email address has nothing before the @")]
    EmptyLocalPart,
    #[error("email address has nothing after the @")]
    EmptyDomain,
}

/// An email address.
///
/// Structural validation only: the commerce platform performs its own
/// checks when the address is used as an account-member username, so this
/// type just rejects obviously malformed input before it goes on the wire.
/// Anything of the shape `local@domain` within the RFC 5321 length limit
/// passes.
///
/// ```
/// use paper_parrot_core::Email;
///
/// assert!(Email::parse("jo@example.com").is_ok());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@example.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Longest address accepted (the RFC 5321 path limit).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] naming the first structural problem found:
    /// empty input, over-length input, a missing `@`, or an empty side of
    /// the `@`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong(Self::MAX_LENGTH));
        }

        match s.split_once('@') {
            None => Err(EmailError::MissingAtSymbol),
            Some(("", _)) => Err(EmailError::EmptyLocalPart),
            Some((_, "")) => Err(EmailError::EmptyDomain),
            Some(_) => Ok(Self(s.to_owned())),
        }
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_and_tagged_addresses() {
        assert!(Email::parse("jo@example.com").is_ok());
        assert!(Email::parse("jo.bloggs+cards@shop.co.uk").is_ok());
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
    }

    #[test]
    fn test_rejects_address_without_at() {
        assert!(matches!(
            Email::parse("not-an-email"),
            Err(EmailError::MissingAtSymbol)
        ));
    }

    #[test]
    fn test_rejects_empty_local_part() {
        assert!(matches!(
            Email::parse("@example.com"),
            Err(EmailError::EmptyLocalPart)
        ));
    }

    #[test]
    fn test_rejects_empty_domain() {
        assert!(matches!(Email::parse("jo@"), Err(EmailError::EmptyDomain)));
    }

    #[test]
    fn test_rejects_over_length_address() {
        let long = format!("{}@example.com", "j".repeat(250));
        assert!(matches!(Email::parse(&long), Err(EmailError::TooLong(_))));
    }

    #[test]
    fn test_display_matches_input() {
        let email = Email::parse("jo@example.com").expect("valid");
        assert_eq!(email.to_string(), "jo@example.com");
        assert_eq!(email.as_str(), "jo@example.com");
    }
}
