//! Clients for services the storefront depends on.
//!
//! # Services
//!
//! - `products` - The remote product service (search, detail, create, rate)

pub mod products;

pub use products::{ProductService, ProductServiceClient, ServiceError};
