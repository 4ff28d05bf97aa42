//! Product catalog access.
//!
//! # Architecture
//!
//! - The catalog is a single static JSON document (an array of products)
//!   served by the host; there is no per-product endpoint
//! - [`CatalogSource`] abstracts where that document comes from: HTTP, a local
//!   file, or memory
//! - [`CachedCatalog`] optionally wraps a source with an in-memory `moka`
//!   cache
//! - [`ProductQuery`] is the loading/ready/failed state machine that views
//!   consume, filtered by an optional category
//!
//! # Example
//!
//! ```rust,ignore
//! use corner_shop_storefront::catalog::{HttpCatalogSource, ProductQuery};
//!
//! let source = Arc::new(HttpCatalogSource::new(url));
//! let query = ProductQuery::new(source);
//!
//! let view = query.query(Some("lighting")).await;
//! if let Some(error) = view.error {
//!     // render inline message
//! }
//! ```

mod cache;
mod filter;
mod pagination;
mod query;
mod source;

pub use cache::CachedCatalog;
pub use filter::{categories, filter_by_category, find_product};
pub use pagination::{DEFAULT_PAGE_SIZE, PAGE_SIZES, Page, PageRequest, PaginationError};
pub use query::{FetchTicket, ProductQuery, ProductsView, QueryStatus};
pub use source::{FileCatalogSource, HttpCatalogSource, StaticCatalogSource};

use async_trait::async_trait;
use corner_shop_core::Product;
use thiserror::Error;

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog host answered with a non-success status.
    #[error("Catalog returned HTTP {0}")]
    Status(u16),

    /// Reading a local catalog file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog document is not a valid product array.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Somewhere the full product catalog can be fetched from.
///
/// Each call performs a fresh load; implementations do not filter.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every product in the catalog.
    async fn fetch(&self) -> Result<Vec<Product>, CatalogError>;
}
