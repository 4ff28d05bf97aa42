//! Application state shared across handlers.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cart::{CartStorage, CartStore, FileStorage};
use crate::catalog::{
    CachedCatalog, CatalogSource, FileCatalogSource, HttpCatalogSource, ProductQuery,
};
use crate::config::{CatalogLocation, StorefrontConfig};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog source and the cart.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogSource>,
    cart: Mutex<CartStore>,
}

impl AppState {
    /// Create application state from explicit parts.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Where products are loaded from
    /// * `cart_storage` - Durable storage the cart is opened from
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Arc<dyn CatalogSource>,
        cart_storage: Arc<dyn CartStorage>,
    ) -> Self {
        let cart = CartStore::open(cart_storage);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart: Mutex::new(cart),
            }),
        }
    }

    /// Create application state with the sources named in `config`.
    #[must_use]
    pub fn from_config(config: StorefrontConfig) -> Self {
        let source: Arc<dyn CatalogSource> = match &config.catalog {
            CatalogLocation::Url(url) => Arc::new(HttpCatalogSource::new(url.clone())),
            CatalogLocation::File(path) => Arc::new(FileCatalogSource::new(path.clone())),
        };
        let catalog: Arc<dyn CatalogSource> = match config.catalog_cache_ttl {
            Some(ttl) => Arc::new(CachedCatalog::new(source, ttl)),
            None => source,
        };
        let storage = Arc::new(FileStorage::new(config.data_dir.clone()));

        Self::new(config, catalog, storage)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the catalog source.
    #[must_use]
    pub fn catalog(&self) -> Arc<dyn CatalogSource> {
        Arc::clone(&self.inner.catalog)
    }

    /// Start a new product query over the catalog.
    #[must_use]
    pub fn product_query(&self) -> ProductQuery {
        ProductQuery::new(self.catalog())
    }

    /// Get the cart. Lock it for the duration of one operation only.
    #[must_use]
    pub fn cart(&self) -> &Mutex<CartStore> {
        &self.inner.cart
    }
}
