//! Catalog source implementations.

use std::path::PathBuf;

use async_trait::async_trait;
use corner_shop_core::Product;
use tracing::{debug, instrument};

use super::{CatalogError, CatalogSource};

/// Fetches the catalog document with an HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    /// Create a source for the catalog at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Create a source that issues its request through `client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Catalog host returned non-success status");
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let products: Vec<Product> = serde_json::from_str(&body)?;
        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }
}

/// Reads the catalog document from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    /// Create a source for the catalog file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<Vec<Product>, CatalogError> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        let products: Vec<Product> = serde_json::from_str(&body)?;
        debug!(count = products.len(), "Read catalog file");
        Ok(products)
    }
}

/// A fixed in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    products: Vec<Product>,
}

impl StaticCatalogSource {
    /// Create a source that always returns `products`.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.clone())
    }
}
