//! Typed asynchronous client for the Yelp Fusion v3 API.
//!
//! Provides business search, business details, phone search, and review
//! lookups over authenticated HTTP GET round trips. Build a [`FusionClient`]
//! with an API key, fill a [`SearchParams`], and every operation returns a
//! typed result or a [`yelp_core::Error`].

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{FusionClient, FusionClientBuilder, FUSION_BASE_URL};
pub use models::{
    Business, BusinessDetails, Category, Coordinates, Hours, Location, MigrationError, OpenPeriod,
    Review, ReviewResults, ReviewUser, SearchParams, SearchResults,
};

/// Convenient result alias sharing the `yelp-core` error type.
pub type Result<T> = yelp_core::Result<T>;
