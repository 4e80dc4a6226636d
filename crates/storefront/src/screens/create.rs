//! Product creation screen.
//!
//! The pending [`ImageSelection`] is the single source of truth for which
//! files will be uploaded. Previews are a projection of it, recomputed by
//! [`derive_previews`] after every change to the selection.
//!
//! ```text
//! Editing --submit--> Submitting --ok--> redirect to /
//!                                --err-> Failed (form kept, control enabled)
//! Failed  --edit----> Editing
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bazaar_core::{DraftField, ImageFile, ImageSelection, ProductDraft};
use futures::future::join_all;
use tracing::instrument;

use super::Navigation;
use crate::services::ProductService;

/// Message shown when the product service rejects the creation.
pub const CREATE_FAILED: &str = "Error creating the product";

/// Message shown when previews cannot be produced.
pub const PREVIEW_FAILED: &str = "Could not preview the selected images";

/// An inline preview of one selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    pub file_name: String,
    /// `data:` URL usable directly as an `<img src>`.
    pub data_url: String,
}

/// Submission status of the creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CreationStatus {
    #[default]
    Editing,
    /// The create request is in flight; the submit control is disabled.
    Submitting,
    /// The last submission failed with the given message.
    Failed(String),
}

/// Decode every file into a preview.
///
/// Each file is encoded on its own blocking task. The list is published
/// only once all tasks finish, in selection order regardless of which task
/// finished first.
///
/// # Errors
///
/// Returns the join error of the first task that panicked or was cancelled.
pub async fn derive_previews(
    files: &[ImageFile],
) -> Result<Vec<ImagePreview>, tokio::task::JoinError> {
    let tasks = files.iter().cloned().map(|file| {
        tokio::task::spawn_blocking(move || ImagePreview {
            data_url: format!(
                "data:{};base64,{}",
                file.content_type,
                STANDARD.encode(&file.data)
            ),
            file_name: file.file_name,
        })
    });

    join_all(tasks).await.into_iter().collect()
}

/// State of one creation form session.
#[derive(Debug, Clone, Default)]
pub struct CreationScreen {
    draft: ProductDraft,
    selection: ImageSelection,
    previews: Vec<ImagePreview>,
    status: CreationStatus,
    /// Problem with the last file selection or removal.
    notice: Option<String>,
}

impl CreationScreen {
    /// An empty form accepting at most `max_images` files.
    #[must_use]
    pub fn new(max_images: usize) -> Self {
        Self {
            selection: ImageSelection::with_limit(max_images),
            ..Self::default()
        }
    }

    /// Rebuild a form session from a stored draft and selection.
    pub async fn restore(draft: ProductDraft, selection: ImageSelection) -> Self {
        let mut screen = Self {
            draft,
            selection,
            ..Self::default()
        };
        screen.refresh_previews().await;
        screen
    }

    #[must_use]
    pub const fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    #[must_use]
    pub const fn selection(&self) -> &ImageSelection {
        &self.selection
    }

    #[must_use]
    pub fn previews(&self) -> &[ImagePreview] {
        &self.previews
    }

    #[must_use]
    pub const fn status(&self) -> &CreationStatus {
        &self.status
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        !matches!(self.status, CreationStatus::Submitting)
    }

    /// Apply one raw form value.
    pub fn set_field(&mut self, field: DraftField, raw: &str) {
        self.draft.set(field, raw);
        if matches!(self.status, CreationStatus::Failed(_)) {
            self.status = CreationStatus::Editing;
        }
    }

    /// Replace the pending selection with freshly picked files.
    ///
    /// An over-cap selection is refused and the previous one kept.
    pub async fn select_files(&mut self, files: Vec<ImageFile>) {
        match self.selection.replace(files) {
            Ok(()) => {
                self.notice = None;
                self.refresh_previews().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Image selection refused");
                self.notice = Some(e.to_string());
            }
        }
    }

    /// Drop the file behind preview `index` and re-derive previews.
    pub async fn remove_image(&mut self, index: usize) {
        match self.selection.remove(index) {
            Ok(removed) => {
                tracing::debug!(file = %removed.file_name, "Image removed from selection");
                self.notice = None;
                self.refresh_previews().await;
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    /// Submit the draft and its images.
    ///
    /// Local validation failures and service failures both leave the form
    /// intact with the control re-enabled.
    #[instrument(skip(self, service), fields(name = %self.draft.name, images = self.selection.len()))]
    pub async fn submit<S: ProductService>(&mut self, service: &S) -> Navigation {
        if !self.can_submit() {
            return Navigation::Stay;
        }

        if let Err(e) = self
            .draft
            .validate()
            .and_then(|()| self.selection.check_limit())
        {
            tracing::debug!(error = %e, "Draft rejected before submission");
            self.status = CreationStatus::Failed(e.to_string());
            return Navigation::Stay;
        }

        self.status = CreationStatus::Submitting;

        match service.create(&self.draft, self.selection.files()).await {
            Ok(product) => {
                tracing::info!(product_id = %product.id, "Product created");
                self.status = CreationStatus::Editing;
                Navigation::root()
            }
            Err(e) => {
                tracing::error!(error = %e, "Product creation failed");
                self.status = CreationStatus::Failed(CREATE_FAILED.to_string());
                Navigation::Stay
            }
        }
    }

    async fn refresh_previews(&mut self) {
        self.previews = match derive_previews(self.selection.files()).await {
            Ok(previews) => previews,
            Err(e) => {
                tracing::error!(error = %e, "Preview decoding failed");
                self.notice = Some(PREVIEW_FAILED.to_string());
                Vec::new()
            }
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::DEFAULT_MAX_IMAGES;

    use super::*;
    use crate::screens::testing::{Call, FakeService};

    fn image(name: &str, bytes: &[u8]) -> ImageFile {
        ImageFile::new(name, "image/png", bytes.to_vec()).unwrap()
    }

    fn filled() -> CreationScreen {
        let mut screen = CreationScreen::new(DEFAULT_MAX_IMAGES);
        for (field, value) in [
            (DraftField::Name, "Desk Lamp"),
            (DraftField::Description, "Warm light"),
            (DraftField::Price, "19.99"),
            (DraftField::Brand, "Acme"),
            (DraftField::Stock, "4"),
            (DraftField::Category, "home"),
        ] {
            screen.set_field(field, value);
        }
        screen
    }

    #[tokio::test]
    async fn test_previews_follow_selection_order() {
        let files: Vec<_> = (0..5u8).map(|i| image(&format!("{i}.png"), &[i; 64])).collect();

        let previews = derive_previews(&files).await.unwrap();

        let names: Vec<_> = previews.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, ["0.png", "1.png", "2.png", "3.png", "4.png"]);
        assert!(previews[0].data_url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_two_files_then_remove_first() {
        let mut screen = CreationScreen::new(DEFAULT_MAX_IMAGES);

        screen
            .select_files(vec![image("a.png", b"first"), image("b.png", b"second")])
            .await;
        assert_eq!(screen.previews().len(), 2);

        screen.remove_image(0).await;

        assert_eq!(screen.selection().len(), 1);
        assert_eq!(&*screen.selection().files()[0].data, b"second");
        assert_eq!(screen.previews().len(), 1);
        assert_eq!(screen.previews()[0].file_name, "b.png");
    }

    #[tokio::test]
    async fn test_over_cap_selection_is_refused() {
        let mut screen = CreationScreen::new(2);
        screen.select_files(vec![image("a.png", b"a")]).await;

        screen
            .select_files(vec![image("b.png", b"b"), image("c.png", b"c"), image("d.png", b"d")])
            .await;

        assert_eq!(screen.selection().len(), 1);
        assert_eq!(screen.previews().len(), 1);
        assert!(screen.notice().unwrap().contains("at most 2"));
    }

    #[tokio::test]
    async fn test_remove_out_of_range_sets_notice() {
        let mut screen = CreationScreen::new(DEFAULT_MAX_IMAGES);
        screen.remove_image(3).await;
        assert_eq!(screen.notice(), Some("no image at position 3"));
    }

    #[tokio::test]
    async fn test_submit_without_images_navigates_home() {
        let service = FakeService::default();
        let mut screen = filled();

        let nav = screen.submit(&service).await;

        assert_eq!(nav, Navigation::root());
        assert_eq!(
            service.calls(),
            vec![Call::Create {
                name: "Desk Lamp".to_string(),
                images: Vec::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_submit_sends_selected_images() {
        let service = FakeService::default();
        let mut screen = filled();
        screen
            .select_files(vec![image("a.png", b"a"), image("b.png", b"b")])
            .await;

        screen.submit(&service).await;

        assert!(matches!(
            &service.calls()[0],
            Call::Create { images, .. } if images == &["a.png", "b.png"]
        ));
    }

    #[tokio::test]
    async fn test_missing_field_is_not_sent() {
        let service = FakeService::default();
        let mut screen = filled();
        screen.set_field(DraftField::Brand, "  ");

        let nav = screen.submit(&service).await;

        assert_eq!(nav, Navigation::Stay);
        assert_eq!(
            screen.status(),
            &CreationStatus::Failed("brand is required".to_string())
        );
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_service_failure_keeps_form() {
        let service = FakeService::default();
        service.set(&service.fail_create);
        let mut screen = filled();

        let nav = screen.submit(&service).await;

        assert_eq!(nav, Navigation::Stay);
        assert_eq!(
            screen.status(),
            &CreationStatus::Failed(CREATE_FAILED.to_string())
        );
        assert!(screen.can_submit());
        assert_eq!(screen.draft().name, "Desk Lamp");
    }

    #[test]
    fn test_invalid_numbers_coerce_to_zero() {
        let mut screen = CreationScreen::new(DEFAULT_MAX_IMAGES);
        screen.set_field(DraftField::Price, "abc");
        screen.set_field(DraftField::Stock, "x1");
        assert_eq!(screen.draft().value(DraftField::Price), "0");
        assert_eq!(screen.draft().stock, 0);
    }
}
