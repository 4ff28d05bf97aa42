//! In-memory caching for the catalog document.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use corner_shop_core::Product;
use moka::future::Cache;
use tracing::debug;

use super::{CatalogError, CatalogSource};

/// Cache key for catalog documents.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Catalog,
}

/// A [`CatalogSource`] that remembers the last successful fetch for a TTL.
///
/// Failed fetches are never cached.
pub struct CachedCatalog {
    inner: Arc<dyn CatalogSource>,
    cache: Cache<CacheKey, Arc<Vec<Product>>>,
}

impl CachedCatalog {
    /// Wrap `inner`, caching its catalog for `ttl`.
    #[must_use]
    pub fn new(inner: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { inner, cache }
    }

    /// Drop the cached catalog so the next fetch goes to the source.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&CacheKey::Catalog).await;
    }
}

#[async_trait]
impl CatalogSource for CachedCatalog {
    async fn fetch(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(products) = self.cache.get(&CacheKey::Catalog).await {
            debug!("Catalog cache hit");
            return Ok(products.as_ref().clone());
        }

        let products = self.inner.fetch().await?;
        self.cache
            .insert(CacheKey::Catalog, Arc::new(products.clone()))
            .await;
        Ok(products)
    }
}
