//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page with the search box
//! POST /search                  - Search box submission (303 or 204)
//!
//! # Products
//! GET  /items?search={text}     - Search results
//! GET  /items/{id}              - Product detail
//! POST /items/{id}/rating       - Submit a 1-5 star rating
//!
//! # Creation form (multipart)
//! GET  /create                  - Empty form
//! POST /create                  - Submit the product
//! POST /create/images           - Replace the image selection
//! POST /create/images/remove    - Remove one previewed image
//! ```

pub mod create;
pub mod home;
pub mod products;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::services::ProductService;
use crate::state::AppState;

/// Create the product routes router.
pub fn item_routes<S: ProductService + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(search::index::<S>))
        .route("/{id}", get(products::show::<S>))
        .route("/{id}/rating", post(products::rate::<S>))
}

/// Create the creation form router.
pub fn create_routes<S: ProductService + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(create::form::<S>).post(create::submit::<S>))
        .route("/images", post(create::select_images::<S>))
        .route("/images/remove", post(create::remove_image::<S>))
}

/// Create all routes for the storefront.
pub fn routes<S: ProductService + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(home::home))
        .route("/search", post(search::submit))
        .nest("/items", item_routes())
        .nest("/create", create_routes())
}
