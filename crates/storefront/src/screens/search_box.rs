//! Reusable search input.

use bazaar_core::SearchQuery;

use super::Navigation;

/// Path of the search results screen.
pub const RESULTS_PATH: &str = "/items";

/// Search box shown on the home page and above search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBox {
    /// Text currently in the input.
    pub text: String,
}

impl SearchBox {
    /// A search box pre-filled with `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Submit the box.
    ///
    /// Blank input produces no navigation. Anything else navigates once to
    /// the results screen with the text percent-encoded into `search`.
    #[must_use]
    pub fn submit(&self) -> Navigation {
        match SearchQuery::parse(&self.text) {
            Ok(query) => Navigation::Redirect(results_url(&query)),
            Err(_) => Navigation::Stay,
        }
    }
}

/// URL of the results screen for `query`.
#[must_use]
pub fn results_url(query: &SearchQuery) -> String {
    format!(
        "{RESULTS_PATH}?search={}",
        urlencoding::encode(query.as_str())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_navigates_to_results() {
        let nav = SearchBox::new("laptop").submit();
        assert_eq!(nav, Navigation::Redirect("/items?search=laptop".to_string()));
    }

    #[test]
    fn test_submit_percent_encodes() {
        let nav = SearchBox::new("café & tea/2").submit();
        assert_eq!(
            nav,
            Navigation::Redirect("/items?search=caf%C3%A9%20%26%20tea%2F2".to_string())
        );
    }

    #[test]
    fn test_blank_input_stays() {
        assert_eq!(SearchBox::default().submit(), Navigation::Stay);
        assert_eq!(SearchBox::new("   ").submit(), Navigation::Stay);
    }
}
