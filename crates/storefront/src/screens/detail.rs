//! Product detail screen and its rating widget.
//!
//! ```text
//! load(blank id)  -> redirect to /
//! load(id)        -> Loading --ok--> Loaded(product)
//!                            --err-> Failed
//!
//! rating widget:
//! Unselected --select(1..5)--> Selected --submit--> Submitting
//!   Submitting --ok--> refetch, Unselected
//!   Submitting --err-> Selected (notice shown)
//! ```
//!
//! The widget is independent of the page state but only accepts a
//! submission while a product is loaded.

use bazaar_core::{Product, ProductId, RatingValue};
use tracing::instrument;

use super::Navigation;
use crate::services::ProductService;

/// Message shown when the product cannot be loaded.
pub const NOT_FOUND: &str = "Product not found";

/// Notice shown when a rating submission fails.
pub const RATING_FAILED: &str = "Your rating could not be submitted";

/// Page states of the detail screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailState {
    /// The product request is in flight.
    #[default]
    Loading,
    /// The product is shown.
    Loaded(Product),
    /// The product could not be loaded. Nothing further is requested.
    Failed {
        message: String,
        /// The service reported the identifier as unknown.
        not_found: bool,
    },
}

/// Sub-state of the star rating widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RatingWidget {
    #[default]
    Unselected,
    Selected(RatingValue),
    /// A rating is being sent; further submissions are refused.
    Submitting(RatingValue),
}

impl RatingWidget {
    /// Selected star count, 0 when nothing is selected.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Unselected => 0,
            Self::Selected(v) | Self::Submitting(v) => v.get(),
        }
    }
}

/// Product detail screen.
#[derive(Debug, Default)]
pub struct DetailScreen {
    id: Option<ProductId>,
    state: DetailState,
    rating: RatingWidget,
    notice: Option<String>,
}

impl DetailScreen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &DetailState {
        &self.state
    }

    #[must_use]
    pub const fn rating(&self) -> RatingWidget {
        self.rating
    }

    /// Inline notice left by the last rating attempt.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Product being shown, if loaded.
    #[must_use]
    pub const fn product(&self) -> Option<&Product> {
        match &self.state {
            DetailState::Loaded(product) => Some(product),
            _ => None,
        }
    }

    /// Load the product named by the raw route identifier.
    #[instrument(skip(self, service))]
    pub async fn load<S: ProductService>(&mut self, service: &S, raw_id: &str) -> Navigation {
        let Some(id) = ProductId::parse(raw_id) else {
            tracing::debug!("Missing product id, redirecting home");
            return Navigation::root();
        };

        self.state = DetailState::Loading;
        self.state = match service.fetch_detail(&id).await {
            Ok(product) => DetailState::Loaded(product),
            Err(e) => {
                tracing::warn!(error = %e, product_id = %id, "Failed to load product");
                DetailState::Failed {
                    message: NOT_FOUND.to_string(),
                    not_found: e.is_not_found(),
                }
            }
        };
        self.id = Some(id);

        Navigation::Stay
    }

    /// Pick a star count. `0` clears the selection; other out-of-range
    /// values are ignored. Refused while a submission is in flight.
    pub fn select(&mut self, stars: u8) {
        if matches!(self.rating, RatingWidget::Submitting(_)) {
            return;
        }
        if stars == 0 {
            self.rating = RatingWidget::Unselected;
        } else if let Ok(value) = RatingValue::new(i64::from(stars)) {
            self.rating = RatingWidget::Selected(value);
        }
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        matches!(self.state, DetailState::Loaded(_))
            && matches!(self.rating, RatingWidget::Selected(_))
    }

    /// Send the selected rating.
    ///
    /// On success the product is fetched again in full and the selection
    /// cleared. If that fetch fails, the product returned by the rating call
    /// is shown instead. On failure the product and the selection are kept
    /// and an inline notice is set.
    #[instrument(skip(self, service), fields(product_id = ?self.id))]
    pub async fn submit_rating<S: ProductService>(&mut self, service: &S) {
        if !self.can_submit() {
            return;
        }
        let (Some(id), RatingWidget::Selected(value)) = (self.id.clone(), self.rating) else {
            return;
        };

        self.rating = RatingWidget::Submitting(value);
        self.notice = None;

        match service.rate(&id, value).await {
            Ok(rated) => {
                tracing::info!(value = value.get(), "Rating submitted");
                let product = match service.fetch_detail(&id).await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        tracing::warn!(error = %e, "Refetch after rating failed, using rated product");
                        rated
                    }
                };
                self.state = DetailState::Loaded(product);
                self.rating = RatingWidget::Unselected;
            }
            Err(e) => {
                tracing::error!(error = %e, value = value.get(), "Rating submission failed");
                self.rating = RatingWidget::Selected(value);
                self.notice = Some(RATING_FAILED.to_string());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::screens::testing::{Call, FakeService, product};

    async fn loaded(service: &FakeService, id: &str) -> DetailScreen {
        let mut screen = DetailScreen::new();
        assert_eq!(screen.load(service, id).await, Navigation::Stay);
        screen
    }

    #[tokio::test]
    async fn test_blank_id_redirects_without_request() {
        let service = FakeService::default();
        let mut screen = DetailScreen::new();

        assert_eq!(screen.load(&service, "  ").await, Navigation::root());
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_shows_product() {
        let service = FakeService::with_products(vec![product("abc123", "Laptop")]);
        let screen = loaded(&service, "abc123").await;

        assert_eq!(screen.product().unwrap().name, "Laptop");
        assert_eq!(screen.rating().value(), 0);
        assert!(!screen.can_submit());
    }

    #[tokio::test]
    async fn test_failed_load_issues_no_further_requests() {
        let service = FakeService::default();
        let mut screen = loaded(&service, "missing").await;

        assert_eq!(
            screen.state(),
            &DetailState::Failed {
                message: NOT_FOUND.to_string(),
                not_found: true,
            }
        );

        screen.select(4);
        assert!(!screen.can_submit());
        screen.submit_rating(&service).await;

        assert_eq!(service.calls(), vec![Call::FetchDetail("missing".to_string())]);
    }

    #[tokio::test]
    async fn test_unavailable_service_is_not_marked_not_found() {
        let service = FakeService::with_products(vec![product("abc123", "Laptop")]);
        service.set(&service.fail_detail);
        let screen = loaded(&service, "abc123").await;

        assert!(matches!(
            screen.state(),
            DetailState::Failed { not_found: false, .. }
        ));
    }

    #[tokio::test]
    async fn test_rating_submits_then_refetches_and_resets() {
        let service = FakeService::with_products(vec![product("abc123", "Laptop")]);
        let mut screen = loaded(&service, "abc123").await;

        screen.select(4);
        assert!(screen.can_submit());
        screen.submit_rating(&service).await;

        assert_eq!(
            service.calls(),
            vec![
                Call::FetchDetail("abc123".to_string()),
                Call::Rate("abc123".to_string(), 4),
                Call::FetchDetail("abc123".to_string()),
            ]
        );
        assert_eq!(screen.rating().value(), 0);
        let product = screen.product().unwrap();
        assert_eq!(product.rating_count(), 1);
        assert!((product.average_rating() - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_failed_rating_keeps_selection_and_product() {
        let service = FakeService::with_products(vec![product("abc123", "Laptop")]);
        service.set(&service.fail_rate);
        let mut screen = loaded(&service, "abc123").await;

        screen.select(2);
        screen.submit_rating(&service).await;

        assert_eq!(screen.rating().value(), 2);
        assert_eq!(screen.notice(), Some(RATING_FAILED));
        assert_eq!(screen.product().unwrap().rating_count(), 0);
        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_refetch_failure_falls_back_to_rated_product() {
        let service = FakeService::with_products(vec![product("abc123", "Laptop")]);
        let mut screen = loaded(&service, "abc123").await;
        service.set(&service.fail_detail);

        screen.select(5);
        screen.submit_rating(&service).await;

        assert_eq!(screen.rating(), RatingWidget::Unselected);
        assert_eq!(screen.product().unwrap().rating_count(), 1);
    }

    #[test]
    fn test_select_bounds() {
        let mut screen = DetailScreen::new();
        screen.select(3);
        assert_eq!(screen.rating().value(), 3);
        screen.select(9);
        assert_eq!(screen.rating().value(), 3);
        screen.select(0);
        assert_eq!(screen.rating(), RatingWidget::Unselected);
    }

    #[tokio::test]
    async fn test_no_submission_without_selection() {
        let service = FakeService::with_products(vec![product("abc123", "Laptop")]);
        let mut screen = loaded(&service, "abc123").await;

        screen.submit_rating(&service).await;

        assert_eq!(service.calls().len(), 1);
    }
}
