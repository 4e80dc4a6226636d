//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types shared by every Bazaar component:
//! - `storefront` - Server-rendered storefront talking to the product service
//! - `integration-tests` - End-to-end tests against a fake product service
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Product view-model, ratings, prices, creation drafts and
//!   search queries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
