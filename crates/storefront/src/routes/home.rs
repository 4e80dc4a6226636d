//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::screens::SearchBox;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub search: SearchBox,
}

/// Display the home page.
pub async fn home() -> impl IntoResponse {
    HomeTemplate {
        search: SearchBox::default(),
    }
}
