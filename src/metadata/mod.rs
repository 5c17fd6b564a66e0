//! Product metadata pipeline: page scraping, query strategy, image search.

pub mod client;
pub mod heuristics;
pub mod models;
pub mod page;
pub mod parser;
pub mod resolver;
pub mod search;
pub mod selectors;
pub mod strategy;

#[cfg(feature = "price")]
pub mod price;

pub use client::{GoogleImageSearch, HttpPageFetcher, ImageSearch, PageFetch};
pub use models::{Fallback, PlanReport, ProductMetadata, QueryPlan, SearchStrategy, UrlComponents};
pub use page::PageScraper;
pub use resolver::{HttpMetadataResolver, MetadataResolver};
pub use search::{ImageSearchClient, SearchOutcome};
