//! # yelp-core
//!
//! Core types and utilities for the Yelp Fusion v3 API client.
//!
//! This crate provides the shared error type, HTTP client configuration, and
//! query-string assembly used by the `yelp-fusion` client crate.
//!
//! ## Modules
//!
//! - [`error`] - Error types shared by every Fusion operation
//! - [`client`] - HTTP client configuration (timeouts, pooling, compression)
//! - [`query`] - Ordered query-string builder with form-urlencoded escaping

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod query;

// Re-export commonly used types
pub use error::{Error, Result};
