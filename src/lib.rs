//! product-meta - Resolve a representative image and title for any product URL
//!
//! Reads OpenGraph/Twitter share tags from the product page and, when the page
//! has no image, falls back to an image search built from the URL itself.

pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod metadata;
pub mod retry;

pub use config::Config;
pub use error::PipelineError;
pub use metadata::models::{ProductMetadata, SearchStrategy, UrlComponents};
pub use metadata::resolver::MetadataResolver;
pub use retry::RetryPolicy;
