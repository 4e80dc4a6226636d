//! Product view-model shared by every screen.
//!
//! Mirrors the product service's JSON shape:
//!
//! ```json
//! {
//!   "_id": "665f1c2e9b1d8a0012345678",
//!   "name": "Laptop Pro 14",
//!   "description": "...",
//!   "price": 1299.99,
//!   "brand": "Acme",
//!   "stock": 12,
//!   "category": "laptops",
//!   "images": ["https://..."],
//!   "ratings": [{ "value": 4, "createdAt": "2024-06-01T12:00:00.000Z" }],
//!   "createdAt": "2024-05-30T09:15:00.000Z"
//! }
//! ```
//!
//! The average rating is never stored: it is recomputed from `ratings` every
//! time it is asked for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Number of description characters shown on catalog cards.
const EXCERPT_CHARS: usize = 100;

/// Number of thumbnails shown under the primary image.
const THUMBNAIL_COUNT: usize = 4;

/// Errors that can occur when constructing a [`RatingValue`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    /// The value lies outside 1..=5.
    #[error("rating must be between {min} and {max} (got {value})", min = RatingValue::MIN, max = RatingValue::MAX)]
    OutOfRange {
        /// The rejected value.
        value: i64,
    },
}

/// A single star score, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RatingValue(u8);

impl RatingValue {
    /// Lowest allowed score.
    pub const MIN: u8 = 1;
    /// Highest allowed score.
    pub const MAX: u8 = 5;

    /// Create a rating value.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] unless `value` is within 1..=5.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(RatingError::OutOfRange { value }),
        }
    }

    /// Returns the score as a plain integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingValue> for u8 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

/// One rating event. Append-only: the storefront never edits or removes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub value: RatingValue,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A catalog product as returned by the product service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Arithmetic mean of all rating values, or `0.0` when unrated.
    #[must_use]
    pub fn average_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.ratings.iter().map(|r| u32::from(r.value.get())).sum();
        #[allow(clippy::cast_precision_loss)] // rating counts never approach 2^52
        let count = self.ratings.len() as f64;
        f64::from(sum) / count
    }

    /// Number of filled stars when displaying the average (nearest integer).
    ///
    /// Only the display is rounded; [`Self::average_rating`] is unaffected.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // average is within 0..=5
    pub fn filled_stars(&self) -> u8 {
        self.average_rating().round() as u8
    }

    /// Number of ratings received.
    #[must_use]
    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    /// Whether any units are available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// First image, used as the card and hero image.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Images shown in the detail page thumbnail strip.
    #[must_use]
    pub fn thumbnails(&self) -> &[String] {
        let end = self.images.len().min(THUMBNAIL_COUNT);
        self.images.get(..end).unwrap_or_default()
    }

    /// Description shortened for catalog cards.
    #[must_use]
    pub fn excerpt(&self) -> String {
        let mut chars = self.description.chars();
        let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}
