//! Creation drafts: the unsaved state behind the "create product" form.
//!
//! A draft is six scalar fields plus an [`ImageSelection`]. The selection is
//! the only record of which files are pending upload; previews are derived
//! from it by the storefront and are never edited on their own.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use super::price::Price;

/// Default cap on the number of images attached to one product.
pub const DEFAULT_MAX_IMAGES: usize = 5;

/// Errors raised while editing or validating a draft.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// A required text field is blank.
    #[error("{0} is required")]
    MissingField(DraftField),

    /// Price or stock is negative.
    #[error("{0} cannot be negative")]
    Negative(DraftField),

    /// More files than the cap allows.
    #[error("at most {limit} images can be uploaded (got {count})")]
    TooManyImages {
        /// Configured cap.
        limit: usize,
        /// Number of files offered.
        count: usize,
    },

    /// A selected file is not an image.
    #[error("{file_name} is not an image")]
    NotAnImage {
        /// Name of the rejected file.
        file_name: String,
    },

    /// Preview removal pointed past the end of the selection.
    #[error("no image at position {0}")]
    NoSuchImage(usize),
}

/// The scalar fields of a draft, named as they appear in forms and in the
/// product service's multipart payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Description,
    Price,
    Brand,
    Stock,
    Category,
}

impl DraftField {
    /// All fields in payload order.
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Description,
        Self::Price,
        Self::Brand,
        Self::Stock,
        Self::Category,
    ];

    /// Form / multipart field name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::Brand => "brand",
            Self::Stock => "stock",
            Self::Category => "category",
        }
    }
}

impl std::fmt::Display for DraftField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or(())
    }
}

/// Scalar fields of a product being created.
///
/// Defaults are empty strings and zero numerics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub brand: String,
    pub stock: i64,
    pub category: String,
}

impl ProductDraft {
    /// Apply one raw form value.
    ///
    /// Price and stock coerce text that does not parse as a number to zero
    /// instead of rejecting it.
    pub fn set(&mut self, field: DraftField, raw: &str) {
        match field {
            DraftField::Name => self.name = raw.to_owned(),
            DraftField::Description => self.description = raw.to_owned(),
            DraftField::Brand => self.brand = raw.to_owned(),
            DraftField::Category => self.category = raw.to_owned(),
            DraftField::Price => self.price = Decimal::from_str(raw.trim()).unwrap_or_default(),
            DraftField::Stock => self.stock = coerce_stock(raw),
        }
    }

    /// Current value of a field as it should be echoed back into the form.
    #[must_use]
    pub fn value(&self, field: DraftField) -> String {
        match field {
            DraftField::Name => self.name.clone(),
            DraftField::Description => self.description.clone(),
            DraftField::Brand => self.brand.clone(),
            DraftField::Category => self.category.clone(),
            DraftField::Price => self.price.normalize().to_string(),
            DraftField::Stock => self.stock.to_string(),
        }
    }

    /// Check the form's required / minimum constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, checked in payload order.
    pub fn validate(&self) -> Result<(), DraftError> {
        for field in DraftField::ALL {
            match field {
                DraftField::Price => {
                    Price::new(self.price).map_err(|_| DraftError::Negative(field))?;
                }
                DraftField::Stock => {
                    if self.stock < 0 {
                        return Err(DraftError::Negative(field));
                    }
                }
                _ => {
                    if self.value(field).trim().is_empty() {
                        return Err(DraftError::MissingField(field));
                    }
                }
            }
        }
        Ok(())
    }

    /// `(name, value)` pairs for the multipart payload, in payload order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        DraftField::ALL
            .into_iter()
            .map(|field| (field.as_str(), self.value(field)))
            .collect()
    }
}

/// Whole numbers are taken as-is, fractional input is truncated, anything
/// else becomes zero.
#[allow(clippy::cast_possible_truncation)] // truncation is the intended coercion
fn coerce_stock(raw: &str) -> i64 {
    let raw = raw.trim();
    raw.parse::<i64>().unwrap_or_else(|_| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map_or(0, |v| v.trunc() as i64)
    })
}

/// A file picked in the creation form, held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Arc<[u8]>,
}

impl ImageFile {
    /// Create an image file, rejecting non-image content types.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::NotAnImage`] unless the content type is `image/*`.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Result<Self, DraftError> {
        let file_name = file_name.into();
        let content_type = content_type.into();
        if !content_type.starts_with("image/") {
            return Err(DraftError::NotAnImage { file_name });
        }
        Ok(Self {
            file_name,
            content_type,
            data: data.into(),
        })
    }

    /// Size of the file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the file has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The pending file selection of one creation form, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    files: Vec<ImageFile>,
    limit: usize,
}

impl Default for ImageSelection {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_IMAGES)
    }
}

impl ImageSelection {
    /// An empty selection accepting at most `limit` files.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            files: Vec::new(),
            limit,
        }
    }

    /// Replace the whole selection, as a file picker does.
    ///
    /// An empty `files` clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::TooManyImages`] and leaves the selection
    /// unchanged if `files` exceeds the cap.
    pub fn replace(&mut self, files: Vec<ImageFile>) -> Result<(), DraftError> {
        if files.len() > self.limit {
            return Err(DraftError::TooManyImages {
                limit: self.limit,
                count: files.len(),
            });
        }
        self.files = files;
        Ok(())
    }

    /// Remove the file at `index`, shifting later files down.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::NoSuchImage`] if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Result<ImageFile, DraftError> {
        if index >= self.files.len() {
            return Err(DraftError::NoSuchImage(index));
        }
        Ok(self.files.remove(index))
    }

    /// Check the cap again, e.g. right before submitting.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::TooManyImages`] if the selection is over the cap.
    pub fn check_limit(&self) -> Result<(), DraftError> {
        if self.files.len() > self.limit {
            return Err(DraftError::TooManyImages {
                limit: self.limit,
                count: self.files.len(),
            });
        }
        Ok(())
    }

    /// Selected files in selection order.
    #[must_use]
    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    /// Maximum number of files.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Number of selected files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn png(name: &str, bytes: &[u8]) -> ImageFile {
        ImageFile::new(name, "image/png", bytes.to_vec()).unwrap()
    }

    fn complete_draft() -> ProductDraft {
        let mut draft = ProductDraft::default();
        draft.set(DraftField::Name, "Laptop");
        draft.set(DraftField::Description, "Thin and light");
        draft.set(DraftField::Price, "999.90");
        draft.set(DraftField::Brand, "Acme");
        draft.set(DraftField::Stock, "4");
        draft.set(DraftField::Category, "laptops");
        draft
    }

    #[test]
    fn test_defaults() {
        let draft = ProductDraft::default();
        assert_eq!(draft.value(DraftField::Price), "0");
        assert_eq!(draft.value(DraftField::Stock), "0");
        assert!(draft.name.is_empty());
    }

    #[test]
    fn test_invalid_numbers_coerce_to_zero() {
        let mut draft = complete_draft();
        draft.set(DraftField::Price, "twelve");
        draft.set(DraftField::Stock, "");
        assert_eq!(draft.price, Decimal::ZERO);
        assert_eq!(draft.stock, 0);

        draft.set(DraftField::Stock, "7.9");
        assert_eq!(draft.stock, 7);
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(complete_draft().validate().is_ok());

        let mut draft = complete_draft();
        draft.set(DraftField::Brand, "   ");
        assert_eq!(
            draft.validate(),
            Err(DraftError::MissingField(DraftField::Brand))
        );
    }

    #[test]
    fn test_validate_minimums() {
        let mut draft = complete_draft();
        draft.set(DraftField::Stock, "-2");
        assert_eq!(
            draft.validate(),
            Err(DraftError::Negative(DraftField::Stock))
        );

        let mut draft = complete_draft();
        draft.set(DraftField::Price, "-1");
        assert_eq!(
            draft.validate(),
            Err(DraftError::Negative(DraftField::Price))
        );
    }

    #[test]
    fn test_fields_in_payload_order() {
        let names: Vec<_> = complete_draft().fields().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            ["name", "description", "price", "brand", "stock", "category"]
        );
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("stock".parse::<DraftField>(), Ok(DraftField::Stock));
        assert!("images".parse::<DraftField>().is_err());
    }

    #[test]
    fn test_non_image_rejected() {
        let err = ImageFile::new("notes.txt", "text/plain", b"hi".to_vec()).unwrap_err();
        assert_eq!(
            err,
            DraftError::NotAnImage {
                file_name: "notes.txt".to_string()
            }
        );
    }

    #[test]
    fn test_remove_keeps_remaining_file() {
        let mut selection = ImageSelection::default();
        selection
            .replace(vec![png("a.png", b"first"), png("b.png", b"second")])
            .unwrap();

        let removed = selection.remove(0).unwrap();
        assert_eq!(removed.file_name, "a.png");
        assert_eq!(selection.len(), 1);
        assert_eq!(&*selection.files()[0].data, b"second");
        assert_eq!(selection.remove(3), Err(DraftError::NoSuchImage(3)));
    }

    #[test]
    fn test_cap_enforced() {
        let mut selection = ImageSelection::with_limit(2);
        selection.replace(vec![png("a.png", b"a")]).unwrap();

        let err = selection
            .replace(vec![png("a.png", b"a"), png("b.png", b"b"), png("c.png", b"c")])
            .unwrap_err();
        assert_eq!(err, DraftError::TooManyImages { limit: 2, count: 3 });
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_empty_replace_clears() {
        let mut selection = ImageSelection::default();
        selection.replace(vec![png("a.png", b"a")]).unwrap();
        selection.replace(Vec::new()).unwrap();
        assert!(selection.is_empty());
    }
}
