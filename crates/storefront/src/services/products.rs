//! Product service API client.
//!
//! Maps the four catalog operations onto the service's REST endpoints:
//!
//! ```text
//! GET  {base}/items?search={text}    - search
//! GET  {base}/items/{id}             - detail
//! POST {base}/create                 - create (multipart)
//! POST {base}/items/{id}/addrating   - add rating (JSON)
//! ```
//!
//! Every call is a single request: no retries, no caching.

use std::future::Future;
use std::sync::Arc;

use bazaar_core::{ImageFile, Product, ProductDraft, ProductId, RatingValue, SearchQuery};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::ProductServiceConfig;

/// Longest slice of an error body kept in errors and logs.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur when talking to the product service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport failure (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The service does not know the requested product.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service rejected the submitted payload.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint URL could not be built from the base URL.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

impl ServiceError {
    /// Whether the service reported the product as unknown.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// The operations the storefront screens need from the product service.
///
/// Implemented by [`ProductServiceClient`] for production and by recording
/// fakes in tests.
pub trait ProductService: Send + Sync {
    /// Search products by free text.
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<Product>, ServiceError>> + Send;

    /// Fetch a single product.
    fn fetch_detail(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, ServiceError>> + Send;

    /// Create a product from a draft and its images.
    fn create(
        &self,
        draft: &ProductDraft,
        images: &[ImageFile],
    ) -> impl Future<Output = Result<Product, ServiceError>> + Send;

    /// Append one rating and return the updated product.
    fn rate(
        &self,
        id: &ProductId,
        value: RatingValue,
    ) -> impl Future<Output = Result<Product, ServiceError>> + Send;
}

/// HTTP client for the product service.
#[derive(Clone)]
pub struct ProductServiceClient {
    inner: Arc<ProductServiceClientInner>,
}

struct ProductServiceClientInner {
    client: reqwest::Client,
    base_url: Url,
}

/// Body of an add-rating request.
#[derive(Debug, Serialize)]
struct RatingRequest {
    value: u8,
}

impl ProductServiceClient {
    /// Create a new product service client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ProductServiceConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ProductServiceClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Base URL all endpoints hang off.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL by appending percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl ProductService for ProductServiceClient {
    #[instrument(skip(self, query), fields(query = %query))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>, ServiceError> {
        let url = self.endpoint(&["items"])?;
        let response = self
            .inner
            .client
            .get(url)
            .query(&[("search", query.as_str())])
            .send()
            .await?;

        read_json(response, query.as_str()).await
    }

    #[instrument(skip(self, id), fields(product_id = %id))]
    async fn fetch_detail(&self, id: &ProductId) -> Result<Product, ServiceError> {
        let url = self.endpoint(&["items", id.as_str()])?;
        let response = self.inner.client.get(url).send().await?;

        read_json(response, id.as_str()).await
    }

    #[instrument(skip(self, draft, images), fields(name = %draft.name, images = images.len()))]
    async fn create(
        &self,
        draft: &ProductDraft,
        images: &[ImageFile],
    ) -> Result<Product, ServiceError> {
        let url = self.endpoint(&["create"])?;

        let mut form = Form::new();
        for (name, value) in draft.fields() {
            form = form.text(name, value);
        }
        for image in images {
            let part = Part::bytes(image.data.to_vec())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)?;
            form = form.part("images", part);
        }

        let response = self.inner.client.post(url).multipart(form).send().await?;

        read_json(response, &draft.name).await
    }

    #[instrument(skip(self, id, value), fields(product_id = %id, value = value.get()))]
    async fn rate(&self, id: &ProductId, value: RatingValue) -> Result<Product, ServiceError> {
        let url = self.endpoint(&["items", id.as_str(), "addrating"])?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&RatingRequest { value: value.get() })
            .send()
            .await?;

        read_json(response, id.as_str()).await
    }
}

/// Check the status and decode a JSON body.
///
/// `subject` names what the request was about, for `NotFound` errors.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    subject: &str,
) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::warn!(
            status = %status,
            body = %truncate(&body),
            "Product service returned non-success status"
        );
        return Err(classify_failure(status, subject, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(&body),
            "Failed to parse product service response"
        );
        ServiceError::Parse(e.to_string())
    })
}

/// Map a non-success status onto the error taxonomy.
fn classify_failure(status: StatusCode, subject: &str, body: &str) -> ServiceError {
    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(subject.to_string()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::Validation(truncate(body))
        }
        _ => ServiceError::Api {
            status: status.as_u16(),
            message: truncate(body),
        },
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
