//! Product creation form handlers.
//!
//! The form is a single `multipart/form-data` form. Its buttons post the
//! whole form to different actions:
//!
//! ```text
//! POST /create/images         - replace the image selection, show previews
//! POST /create/images/remove  - drop preview `remove=<index>`
//! POST /create                - submit the product
//! ```
//!
//! A hidden `draft_id` field ties the requests of one form session to the
//! selection held in the [`DraftStore`](crate::drafts::DraftStore).

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::{DraftField, ImageFile, ImageSelection, ProductDraft};
use tracing::instrument;

use crate::drafts::{DraftId, StoredDraft};
use crate::error::AppError;
use crate::filters;
use crate::screens::{CreationScreen, CreationStatus, Navigation};
use crate::services::ProductService;
use crate::state::AppState;

/// Multipart field carrying image files.
const IMAGES_FIELD: &str = "images";
/// Hidden field carrying the draft id.
const DRAFT_ID_FIELD: &str = "draft_id";
/// Button field carrying the preview index to remove.
const REMOVE_FIELD: &str = "remove";

/// Scalar field values echoed back into the form.
#[derive(Clone, Default)]
pub struct DraftValues {
    pub name: String,
    pub description: String,
    pub price: String,
    pub brand: String,
    pub stock: String,
    pub category: String,
}

impl From<&ProductDraft> for DraftValues {
    fn from(draft: &ProductDraft) -> Self {
        Self {
            name: draft.value(DraftField::Name),
            description: draft.value(DraftField::Description),
            price: draft.value(DraftField::Price),
            brand: draft.value(DraftField::Brand),
            stock: draft.value(DraftField::Stock),
            category: draft.value(DraftField::Category),
        }
    }
}

/// One preview thumbnail with its remove button.
#[derive(Clone)]
pub struct PreviewView {
    pub index: usize,
    pub file_name: String,
    pub data_url: String,
}

/// Product creation page template.
#[derive(Template, WebTemplate)]
#[template(path = "create.html")]
pub struct CreateTemplate {
    pub draft_id: String,
    pub values: DraftValues,
    pub previews: Vec<PreviewView>,
    pub max_images: usize,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub submit_disabled: bool,
}

impl CreateTemplate {
    fn from_screen(draft_id: DraftId, screen: &CreationScreen) -> Self {
        Self {
            draft_id: draft_id.to_string(),
            values: DraftValues::from(screen.draft()),
            previews: screen
                .previews()
                .iter()
                .enumerate()
                .map(|(index, preview)| PreviewView {
                    index,
                    file_name: preview.file_name.clone(),
                    data_url: preview.data_url.clone(),
                })
                .collect(),
            max_images: screen.selection().limit(),
            error: match screen.status() {
                CreationStatus::Failed(message) => Some(message.clone()),
                _ => None,
            },
            notice: screen.notice().map(String::from),
            submit_disabled: !screen.can_submit(),
        }
    }
}

/// Everything one post of the creation form carries.
#[derive(Debug, Default)]
struct CreateForm {
    draft_id: Option<DraftId>,
    fields: Vec<(DraftField, String)>,
    files: Vec<ImageFile>,
    remove: Option<usize>,
}

/// Read the multipart body.
///
/// An empty file input still posts one part with no file name and no bytes;
/// such parts are skipped.
async fn read_form(mut multipart: Multipart) -> Result<CreateForm, AppError> {
    let mut form = CreateForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGES_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await?;
            if file_name.is_empty() && data.is_empty() {
                continue;
            }
            form.files
                .push(ImageFile::new(file_name, content_type, data.to_vec())?);
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            DRAFT_ID_FIELD => form.draft_id = DraftId::from_str(&value).ok(),
            REMOVE_FIELD => {
                let index = value
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("invalid image index: {value}")))?;
                form.remove = Some(index);
            }
            other => {
                if let Ok(field) = DraftField::from_str(other) {
                    form.fields.push((field, value));
                }
            }
        }
    }

    Ok(form)
}

/// Resume the form session named by the post, or start a new one, and apply
/// the posted field values.
async fn open_session<S>(state: &AppState<S>, form: &CreateForm) -> (DraftId, CreationScreen) {
    let resumed = match form.draft_id {
        Some(id) => state.drafts().get(&id).await.map(|stored| (id, stored)),
        None => None,
    };
    let (id, stored) = resumed.unwrap_or_else(|| {
        (
            DraftId::generate(),
            StoredDraft {
                draft: ProductDraft::default(),
                selection: ImageSelection::with_limit(state.config().uploads.max_images),
            },
        )
    });

    let mut screen = CreationScreen::restore(stored.draft, stored.selection).await;
    for (field, value) in &form.fields {
        screen.set_field(*field, value);
    }
    (id, screen)
}

async fn save<S>(state: &AppState<S>, id: DraftId, screen: &CreationScreen) {
    state
        .drafts()
        .put(
            id,
            StoredDraft {
                draft: screen.draft().clone(),
                selection: screen.selection().clone(),
            },
        )
        .await;
}

/// Display an empty creation form.
pub async fn form<S>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let screen = CreationScreen::new(state.config().uploads.max_images);
    CreateTemplate::from_screen(DraftId::generate(), &screen)
}

/// Replace the image selection and show the previews.
#[instrument(skip(state, multipart))]
pub async fn select_images<S>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = read_form(multipart).await?;
    let files = std::mem::take(&mut form.files);
    let (id, mut screen) = open_session(&state, &form).await;

    screen.select_files(files).await;
    save(&state, id, &screen).await;

    Ok(CreateTemplate::from_screen(id, &screen).into_response())
}

/// Remove one previewed image from the selection.
#[instrument(skip(state, multipart))]
pub async fn remove_image<S>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    let index = form
        .remove
        .ok_or_else(|| AppError::BadRequest("missing image index".to_string()))?;
    let (id, mut screen) = open_session(&state, &form).await;

    screen.remove_image(index).await;
    save(&state, id, &screen).await;

    Ok(CreateTemplate::from_screen(id, &screen).into_response())
}

/// Submit the creation form.
///
/// Files posted along with the submission replace the stored selection
/// first. On success the session is discarded and the browser sent home.
#[instrument(skip(state, multipart))]
pub async fn submit<S: ProductService>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = read_form(multipart).await?;
    let files = std::mem::take(&mut form.files);
    let (id, mut screen) = open_session(&state, &form).await;

    if !files.is_empty() {
        screen.select_files(files).await;
        if screen.notice().is_some() {
            save(&state, id, &screen).await;
            return Ok(CreateTemplate::from_screen(id, &screen).into_response());
        }
    }

    match screen.submit(state.products()).await {
        Navigation::Redirect(to) => {
            state.drafts().discard(&id).await;
            Ok(Redirect::to(&to).into_response())
        }
        Navigation::Stay => {
            save(&state, id, &screen).await;
            Ok(CreateTemplate::from_screen(id, &screen).into_response())
        }
    }
}
