//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PRODUCT_SERVICE_URL` - Base URL of the product service (e.g., `https://api.example.com/api`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `PRODUCT_SERVICE_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `STOREFRONT_MAX_IMAGES` - Image cap for new products (default: 5)
//! - `STOREFRONT_DRAFT_TTL_SECS` - Lifetime of abandoned creation drafts (default: 1800)
//! - `STOREFRONT_MAX_UPLOAD_BYTES` - Request body limit (default: 25 MiB)
//! - `STOREFRONT_STATIC_DIR` - Stylesheet directory (default: crates/storefront/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)
//! - `STOREFRONT_LOG_JSON` - Emit JSON log lines when set to `true` (default: false)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bazaar_core::DEFAULT_MAX_IMAGES;
use thiserror::Error;
use url::Url;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Product service configuration
    pub product_service: ProductServiceConfig,
    /// Creation form limits
    pub uploads: UploadConfig,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
    /// Emit structured JSON logs instead of text
    pub log_json: bool,
}

/// Remote product service configuration.
#[derive(Debug, Clone)]
pub struct ProductServiceConfig {
    /// Base URL every operation path is appended to
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Limits applied to the product creation form.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum images per product
    pub max_images: usize,
    /// How long an untouched draft's image selection is kept
    pub draft_ttl: Duration,
    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_images: DEFAULT_MAX_IMAGES,
            draft_ttl: Duration::from_secs(1800),
            max_body_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when absent
    pub dsn: Option<String>,
    /// Environment tag (e.g., production, staging)
    pub environment: Option<String>,
    /// Fraction of error events to send
    pub sample_rate: f32,
    /// Fraction of transactions to trace
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("STOREFRONT_PORT", "3000")?;
        let static_dir = PathBuf::from(get_env_or_default(
            "STOREFRONT_STATIC_DIR",
            "crates/storefront/static",
        ));

        Ok(Self {
            host,
            port,
            product_service: ProductServiceConfig::from_env()?,
            uploads: UploadConfig::from_env()?,
            static_dir,
            sentry: SentryConfig::from_env()?,
            log_json: parse_env_or_default("STOREFRONT_LOG_JSON", "false")?,
        })
    }

    /// Build a configuration for a service at `base_url` with every other
    /// setting at its default.
    #[must_use]
    pub fn with_service_url(base_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            product_service: ProductServiceConfig {
                base_url,
                timeout: Duration::from_secs(10),
            },
            uploads: UploadConfig::default(),
            static_dir: PathBuf::from("crates/storefront/static"),
            sentry: SentryConfig::default(),
            log_json: false,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ProductServiceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("PRODUCT_SERVICE_URL")?;
        let base_url = parse_base_url(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("PRODUCT_SERVICE_URL".to_string(), e))?;
        let timeout_secs: u64 = parse_env_or_default("PRODUCT_SERVICE_TIMEOUT_SECS", "10")?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl UploadConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_images = parse_env_or_default("STOREFRONT_MAX_IMAGES", "5")?;
        let draft_ttl_secs: u64 = parse_env_or_default("STOREFRONT_DRAFT_TTL_SECS", "1800")?;
        let max_body_bytes = parse_env_or_default(
            "STOREFRONT_MAX_UPLOAD_BYTES",
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )?;

        Ok(Self {
            max_images,
            draft_ttl: Duration::from_secs(draft_ttl_secs),
            max_body_bytes,
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the service base URL.
///
/// A trailing slash is added so that relative joins (`items/{id}`) extend the
/// path instead of replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("https://bazaar.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://bazaar.example.com/api/");
        assert_eq!(
            url.join("items/abc123").unwrap().as_str(),
            "https://bazaar.example.com/api/items/abc123"
        );
    }

    #[test]
    fn test_parse_base_url_keeps_existing_slash() {
        let url = parse_base_url("http://localhost:8080/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config =
            StorefrontConfig::with_service_url(Url::parse("http://localhost:8080/").unwrap());

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_defaults() {
        let uploads = UploadConfig::default();
        assert_eq!(uploads.max_images, 5);
        assert_eq!(uploads.draft_ttl, Duration::from_secs(1800));

        let sentry = SentryConfig::default();
        assert!(sentry.dsn.is_none());
        assert!((sentry.sample_rate - 1.0).abs() < f32::EPSILON);
    }
}
