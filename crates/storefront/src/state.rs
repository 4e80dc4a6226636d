//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::drafts::DraftStore;
use crate::services::{ProductServiceClient, ServiceError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Generic over the product service so routes
/// can be exercised against an in-memory service.
pub struct AppState<S = ProductServiceClient> {
    inner: Arc<AppStateInner<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<S> {
    config: StorefrontConfig,
    products: S,
    drafts: DraftStore,
}

impl AppState {
    /// Create the production state, talking to the configured product service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ServiceError> {
        let products = ProductServiceClient::new(&config.product_service)?;
        Ok(Self::with_service(config, products))
    }
}

impl<S> AppState<S> {
    /// Create state around an existing product service.
    pub fn with_service(config: StorefrontConfig, products: S) -> Self {
        let drafts = DraftStore::new(config.uploads.draft_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                drafts,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product service.
    #[must_use]
    pub fn products(&self) -> &S {
        &self.inner.products
    }

    /// Get a reference to the creation form sessions.
    #[must_use]
    pub fn drafts(&self) -> &DraftStore {
        &self.inner.drafts
    }
}
