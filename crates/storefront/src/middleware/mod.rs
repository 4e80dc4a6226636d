//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span carrying `request_id`)
//! 3. Request ID (reuse or mint `x-request-id`)
//! 4. Security headers (CSP and isolation headers)
//! 5. Body limit (multipart uploads)

pub mod request_id;
pub mod security_headers;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
