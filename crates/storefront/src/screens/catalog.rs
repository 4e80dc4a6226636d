//! Catalog (search results) screen.
//!
//! ```text
//! Idle --navigate(blank)--> Idle + redirect to /
//! Idle --navigate(query)--> Loading --ok--> Loaded
//!                                   --err-> Failed
//! ```
//!
//! Every navigation that changes the query re-enters `Loading`.

use bazaar_core::{Product, SearchQuery};
use tracing::instrument;

use super::Navigation;
use crate::services::ProductService;

/// Message shown when the search request fails.
pub const SEARCH_FAILED: &str = "Error searching for products";

/// States of the catalog screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogState {
    /// No query has been run.
    #[default]
    Idle,
    /// A search for the query is in flight.
    Loading(SearchQuery),
    /// The search finished; `products` may be empty.
    Loaded {
        query: SearchQuery,
        products: Vec<Product>,
    },
    /// The search request failed.
    Failed { query: SearchQuery, message: String },
}

/// Search results screen.
#[derive(Debug, Default)]
pub struct CatalogScreen {
    state: CatalogState,
}

impl CatalogScreen {
    /// A screen that has not searched yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CatalogState {
        &self.state
    }

    /// Consume the screen, returning its final state.
    #[must_use]
    pub fn into_state(self) -> CatalogState {
        self.state
    }

    /// Handle a navigation carrying the raw `search` parameter.
    ///
    /// A missing or blank parameter redirects home without contacting the
    /// service.
    #[instrument(skip(self, service))]
    pub async fn navigate<S: ProductService>(
        &mut self,
        service: &S,
        search: Option<&str>,
    ) -> Navigation {
        let Ok(query) = SearchQuery::parse(search.unwrap_or_default()) else {
            tracing::debug!("Empty search, redirecting home");
            self.state = CatalogState::Idle;
            return Navigation::root();
        };

        self.state = CatalogState::Loading(query.clone());

        self.state = match service.search(&query).await {
            Ok(products) => {
                tracing::info!(results = products.len(), "Search completed");
                CatalogState::Loaded { query, products }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Search failed");
                CatalogState::Failed {
                    query,
                    message: SEARCH_FAILED.to_string(),
                }
            }
        };

        Navigation::Stay
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::screens::testing::{Call, FakeService, product};

    #[tokio::test]
    async fn test_blank_query_redirects_without_searching() {
        let service = FakeService::default();

        for raw in [None, Some(""), Some("   ")] {
            let mut screen = CatalogScreen::new();
            let nav = screen.navigate(&service, raw).await;
            assert_eq!(nav, Navigation::root());
            assert_eq!(screen.state(), &CatalogState::Idle);
        }

        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_query_loads_results() {
        let service = FakeService::with_products(vec![
            product("1", "Laptop Pro"),
            product("2", "Gaming Laptop"),
            product("3", "Desk Lamp"),
        ]);
        let mut screen = CatalogScreen::new();

        let nav = screen.navigate(&service, Some("laptop")).await;

        assert_eq!(nav, Navigation::Stay);
        assert_eq!(service.calls(), vec![Call::Search("laptop".to_string())]);
        match screen.state() {
            CatalogState::Loaded { query, products } => {
                assert_eq!(query.as_str(), "laptop");
                assert_eq!(products.len(), 2);
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_results_is_loaded_and_empty() {
        let service = FakeService::with_products(vec![product("1", "Laptop")]);
        let mut screen = CatalogScreen::new();

        screen.navigate(&service, Some("piano")).await;

        assert!(matches!(
            screen.state(),
            CatalogState::Loaded { products, .. } if products.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_failure_sets_message() {
        let service = FakeService::default();
        service.set(&service.fail_search);
        let mut screen = CatalogScreen::new();

        screen.navigate(&service, Some("laptop")).await;

        assert_eq!(
            screen.into_state(),
            CatalogState::Failed {
                query: SearchQuery::parse("laptop").unwrap(),
                message: SEARCH_FAILED.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_new_query_reloads() {
        let service = FakeService::with_products(vec![product("1", "Laptop"), product("2", "Lamp")]);
        let mut screen = CatalogScreen::new();

        screen.navigate(&service, Some("laptop")).await;
        screen.navigate(&service, Some("lamp")).await;

        assert_eq!(service.calls().len(), 2);
        assert!(matches!(
            screen.state(),
            CatalogState::Loaded { query, .. } if query.as_str() == "lamp"
        ));
    }
}
