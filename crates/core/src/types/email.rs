//! Validated email address.

use core::fmt;

use serde::Serialize;

/// RFC 5321 path limit; longer input is rejected before any other check.
const MAX_EMAIL_LENGTH: usize = 254;

/// Why a raw string was rejected as an email address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("email must not be empty")]
    Empty,
    #[error("email must be at most 254 characters")]
    TooLong,
    #[error("email must look like local@domain")]
    Malformed,
}

/// An address that passed shape validation.
///
/// Validation is deliberately shallow: non-empty text on both sides of an
/// `@`, within the length limit. Whether the mailbox exists is the mail
/// server's problem. Input is stored as given; lookups against stored
/// accounts are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validate a raw string as an email address.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] when the input is empty, over 254 characters,
    /// or missing a local part or domain around the `@`.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        if raw.is_empty() {
            return Err(EmailError::Empty);
        }
        if raw.len() > MAX_EMAIL_LENGTH {
            return Err(EmailError::TooLong);
        }
        match raw.find('@') {
            Some(at) if at > 0 && at + 1 < raw.len() => Ok(Self(raw.to_owned())),
            _ => Err(EmailError::Malformed),
        }
    }

    /// The address as a string slice, for query binds and display names.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plausible_addresses() {
        for raw in [
            "a@b",
            "shopper@example.com",
            "first.last+tag@shop.co.in",
            "x@sub.domain.example",
        ] {
            assert!(Email::parse(raw).is_ok(), "{raw} should parse");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }

    #[test]
    fn test_rejects_oversized() {
        let raw = format!("{}@example.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert_eq!(Email::parse(&raw), Err(EmailError::TooLong));
    }

    #[test]
    fn test_rejects_missing_parts() {
        for raw in ["plainaddress", "@shop.com", "shopper@"] {
            assert_eq!(Email::parse(raw), Err(EmailError::Malformed), "{raw}");
        }
    }

    #[test]
    fn test_display_and_serde_keep_the_raw_string() {
        let email = Email::parse("Shopper@Example.com").unwrap();
        assert_eq!(email.as_str(), "Shopper@Example.com");
        assert_eq!(email.to_string(), "Shopper@Example.com");
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"Shopper@Example.com\""
        );
    }
}
