//! Screen state machines.
//!
//! Each screen owns its request orchestration as an explicit state machine
//! with named states and transitions. Route handlers feed a screen the events
//! carried by an HTTP request (navigation, form submission) and render
//! whatever state it ends up in, or follow the [`Navigation`] it asks for.
//!
//! # Screens
//!
//! - [`catalog`] - Search results for the `search` query parameter
//! - [`detail`] - One product plus the rating widget
//! - [`create`] - Product creation form with image previews
//! - [`search_box`] - Free text to search navigation

pub mod catalog;
pub mod create;
pub mod detail;
pub mod search_box;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{CatalogScreen, CatalogState};
pub use create::{CreationScreen, CreationStatus, ImagePreview};
pub use detail::{DetailScreen, DetailState, RatingWidget};
pub use search_box::SearchBox;

/// Path of the home page.
pub const ROOT_PATH: &str = "/";

/// What the browser should do once a screen event has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Stay on the current screen and render its state.
    Stay,
    /// Go somewhere else.
    Redirect(String),
}

impl Navigation {
    /// Redirect to the home page.
    #[must_use]
    pub fn root() -> Self {
        Self::Redirect(ROOT_PATH.to_string())
    }

    /// Whether this is a redirect.
    #[must_use]
    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}
