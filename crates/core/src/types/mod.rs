//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for the catalog's domain concepts.

pub mod draft;
pub mod id;
pub mod price;
pub mod product;
pub mod search;

pub use draft::{DEFAULT_MAX_IMAGES, DraftError, DraftField, ImageFile, ImageSelection, ProductDraft};
pub use id::ProductId;
pub use price::{Price, PriceError};
pub use product::{Product, Rating, RatingError, RatingValue};
pub use search::{SearchError, SearchQuery};
