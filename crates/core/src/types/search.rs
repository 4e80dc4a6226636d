//! Free-text search queries.

use core::fmt;

/// Errors that can occur when parsing a [`SearchQuery`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    /// The query is empty or whitespace only.
    #[error("search query cannot be empty")]
    EmptyInput,
}

/// A search query that is known to contain something to search for.
///
/// The original text is kept as typed (only checked, not trimmed), since it is
/// what gets echoed back in the results heading and encoded into the URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Parse a query, rejecting blank input.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyInput`] for empty or whitespace-only text.
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        if raw.trim().is_empty() {
            return Err(SearchError::EmptyInput);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Returns the query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SearchQuery {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
