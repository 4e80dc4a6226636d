//! Opaque product identifiers.
//!
//! The product service assigns identifiers; the storefront never invents or
//! interprets them. The only rule enforced here is that an identifier is not
//! blank, since a blank id can never name a product.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned product identifier (the `_id` field on the wire).
///
/// ```
/// use bazaar_core::ProductId;
///
/// assert_eq!(ProductId::parse("abc123").unwrap().as_str(), "abc123");
/// assert!(ProductId::parse("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Parse an identifier taken from a URL segment or form field.
    ///
    /// Surrounding whitespace is trimmed. Returns `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
