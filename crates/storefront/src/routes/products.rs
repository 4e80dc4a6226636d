//! Product detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::{Product, RatingValue};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::screens::{DetailScreen, DetailState, Navigation, RatingWidget};
use crate::services::ProductService;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub href: String,
    pub name: String,
    pub description: String,
    pub excerpt: String,
    pub price: String,
    pub brand: String,
    pub category: String,
    pub in_stock: bool,
    pub stock_label: String,
    pub image: Option<String>,
    pub thumbnails: Vec<String>,
    pub filled_stars: u8,
    pub average: String,
    pub rating_count: usize,
    pub rating_label: String,
}

/// Link to a product's detail page.
#[must_use]
pub fn detail_href(id: &str) -> String {
    format!("/items/{}", urlencoding::encode(id))
}

fn rating_label(count: usize) -> String {
    if count == 1 {
        "1 rating".to_string()
    } else {
        format!("{count} ratings")
    }
}

fn stock_label(stock: u32) -> String {
    if stock == 0 {
        "Out of stock".to_string()
    } else {
        format!("In stock ({stock} available)")
    }
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            href: detail_href(product.id.as_str()),
            name: product.name.clone(),
            description: product.description.clone(),
            excerpt: product.excerpt(),
            price: product.price.display(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            in_stock: product.in_stock(),
            stock_label: stock_label(product.stock),
            image: product.primary_image().map(String::from),
            thumbnails: product.thumbnails().to_vec(),
            filled_stars: product.filled_stars(),
            average: format!("{:.1}", product.average_rating()),
            rating_count: product.rating_count(),
            rating_label: rating_label(product.rating_count()),
        }
    }
}

/// One radio button of the rating widget.
#[derive(Clone)]
pub struct StarOption {
    pub value: u8,
    pub checked: bool,
}

fn star_options(widget: RatingWidget) -> Vec<StarOption> {
    (RatingValue::MIN..=RatingValue::MAX)
        .map(|value| StarOption {
            value,
            checked: widget.value() == value,
        })
        .collect()
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "items/show.html")]
pub struct ItemShowTemplate {
    pub product: ProductView,
    pub rating_action: String,
    pub stars: Vec<StarOption>,
    pub notice: Option<String>,
}

/// Detail page shown when the product cannot be loaded.
#[derive(Template, WebTemplate)]
#[template(path = "items/not_found.html")]
pub struct ItemNotFoundTemplate {
    pub message: String,
}

/// Rating form submission.
#[derive(Debug, Deserialize)]
pub struct RatingForm {
    /// Selected star count, absent when nothing was picked.
    #[serde(default)]
    pub rating: u8,
}

fn render(screen: &DetailScreen) -> Result<Response, AppError> {
    match screen.state() {
        DetailState::Loaded(product) => {
            let view = ProductView::from(product);
            Ok(ItemShowTemplate {
                rating_action: format!("{}/rating", view.href),
                product: view,
                stars: star_options(screen.rating()),
                notice: screen.notice().map(String::from),
            }
            .into_response())
        }
        DetailState::Failed { message, not_found } => {
            let status = if *not_found {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::BAD_GATEWAY
            };
            Ok((
                status,
                ItemNotFoundTemplate {
                    message: message.clone(),
                },
            )
                .into_response())
        }
        DetailState::Loading => Err(AppError::Internal(
            "detail screen rendered before loading".to_string(),
        )),
    }
}

/// Display a product.
#[instrument(skip(state))]
pub async fn show<S: ProductService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let mut screen = DetailScreen::new();
    if let Navigation::Redirect(to) = screen.load(state.products(), &id).await {
        return Ok(Redirect::to(&to).into_response());
    }
    render(&screen)
}

/// Submit a rating and show the refreshed product.
#[instrument(skip(state))]
pub async fn rate<S: ProductService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Form(form): Form<RatingForm>,
) -> Result<Response, AppError> {
    let mut screen = DetailScreen::new();
    if let Navigation::Redirect(to) = screen.load(state.products(), &id).await {
        return Ok(Redirect::to(&to).into_response());
    }

    screen.select(form.rating);
    screen.submit_rating(state.products()).await;

    render(&screen)
}

#[cfg(test)]
mod tests {
    use bazaar_core::{Price, ProductId, Rating};

    use super::*;

    #[allow(clippy::unwrap_used)]
    fn product(stock: u32, ratings: &[i64]) -> Product {
        Product {
            id: ProductId::parse("a b").unwrap(),
            name: "Lamp".to_string(),
            description: "Warm".to_string(),
            price: Price::ZERO,
            brand: "Acme".to_string(),
            stock,
            category: "home".to_string(),
            images: Vec::new(),
            ratings: ratings
                .iter()
                .map(|v| Rating {
                    value: RatingValue::new(*v).unwrap(),
                    created_at: None,
                })
                .collect(),
            created_at: None,
        }
    }

    #[test]
    fn test_view_labels() {
        let view = ProductView::from(&product(3, &[4, 5]));
        assert_eq!(view.href, "/items/a%20b");
        assert_eq!(view.stock_label, "In stock (3 available)");
        assert_eq!(view.average, "4.5");
        assert_eq!(view.filled_stars, 5);
        assert_eq!(view.price, "$0.00");

        let view = ProductView::from(&product(0, &[]));
        assert_eq!(view.stock_label, "Out of stock");
        assert!(!view.in_stock);
        assert_eq!(view.average, "0.0");
        assert_eq!(view.rating_label, "0 ratings");
    }

    #[test]
    fn test_rating_label_singular_and_plural() {
        assert_eq!(ProductView::from(&product(1, &[4])).rating_label, "1 rating");
        assert_eq!(ProductView::from(&product(1, &[4, 5])).rating_label, "2 ratings");
    }

    #[test]
    fn test_star_options_mark_selection() {
        let checked: Vec<u8> = star_options(RatingWidget::Unselected)
            .iter()
            .filter(|s| s.checked)
            .map(|s| s.value)
            .collect();
        assert!(checked.is_empty());
        assert_eq!(star_options(RatingWidget::Unselected).len(), 5);
    }
}
