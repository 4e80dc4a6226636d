//! Search box submission and catalog (search results) handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::routes::products::ProductView;
use crate::screens::{CatalogScreen, CatalogState, Navigation, ROOT_PATH, SearchBox};
use crate::services::ProductService;
use crate::state::AppState;

/// Search box form submission.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
}

/// Query parameters of the results page.
#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    pub search: Option<String>,
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "items/index.html")]
pub struct ItemsTemplate {
    pub search: SearchBox,
    pub query: String,
    pub products: Vec<ProductView>,
    pub count_label: String,
    pub error: Option<String>,
}

fn count_label(count: usize) -> String {
    if count == 1 {
        "1 product".to_string()
    } else {
        format!("{count} products")
    }
}

/// Handle a search box submission.
///
/// Redirects to the results page, or answers `204 No Content` for blank
/// input so the browser stays where it is.
#[instrument]
pub async fn submit(Form(form): Form<SearchForm>) -> Response {
    match SearchBox::new(form.search).submit() {
        Navigation::Redirect(to) => Redirect::to(&to).into_response(),
        Navigation::Stay => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Display search results for the `search` query parameter.
#[instrument(skip(state))]
pub async fn index<S: ProductService>(
    State(state): State<AppState<S>>,
    Query(params): Query<ItemsQuery>,
) -> Response {
    let mut screen = CatalogScreen::new();
    if let Navigation::Redirect(to) = screen
        .navigate(state.products(), params.search.as_deref())
        .await
    {
        return Redirect::to(&to).into_response();
    }

    match screen.into_state() {
        CatalogState::Loaded { query, products } => ItemsTemplate {
            search: SearchBox::new(query.as_str()),
            query: query.as_str().to_string(),
            count_label: count_label(products.len()),
            products: products.iter().map(ProductView::from).collect(),
            error: None,
        }
        .into_response(),
        CatalogState::Failed { query, message } => (
            StatusCode::BAD_GATEWAY,
            ItemsTemplate {
                search: SearchBox::new(query.as_str()),
                query: query.as_str().to_string(),
                count_label: count_label(0),
                products: Vec::new(),
                error: Some(message),
            },
        )
            .into_response(),
        CatalogState::Idle | CatalogState::Loading(_) => Redirect::to(ROOT_PATH).into_response(),
    }
}
