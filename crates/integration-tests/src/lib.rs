//! Integration tests for Corner Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p corner-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_catalog` - Listing, filtering, pagination and detail routes
//! - `storefront_cart` - Cart routes and persistence across restarts
//!
//! Tests drive the router in-process with `tower::ServiceExt::oneshot`; no
//! port is bound and nothing outside a temporary directory is touched.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use corner_shop_core::{Price, Product, ProductId};
use corner_shop_storefront::cart::FileStorage;
use corner_shop_storefront::catalog::{CatalogSource, StaticCatalogSource};
use corner_shop_storefront::config::StorefrontConfig;
use corner_shop_storefront::routes;
use corner_shop_storefront::state::AppState;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Largest response body the helpers will read.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build a catalog product.
#[must_use]
pub fn product(id: i32, name: &str, cents: u32, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::from_cents(cents),
        image: format!("/static/images/{id}.jpg"),
        description: format!("{name} description"),
        category: category.to_string(),
    }
}

/// A small catalog spanning two categories.
#[must_use]
pub fn sample_catalog() -> Vec<Product> {
    vec![
        product(1, "Mug", 999, "kitchen"),
        product(2, "Lamp", 2450, "lighting"),
        product(3, "Board", 3475, "kitchen"),
    ]
}

/// A storefront wired to an in-memory catalog and a temporary data directory.
pub struct TestContext {
    pub state: AppState,
    data_dir: TempDir,
    catalog: Arc<dyn CatalogSource>,
}

impl TestContext {
    /// Create a context serving `products`.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(products: Vec<Product>) -> Self {
        Self::with_source(Arc::new(StaticCatalogSource::new(products)))
    }

    /// Create a context loading its catalog from `catalog`.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_source(catalog: Arc<dyn CatalogSource>) -> Self {
        let data_dir = tempfile::tempdir().expect("create temp dir");
        let state = build_state(data_dir.path(), Arc::clone(&catalog));
        Self {
            state,
            data_dir,
            catalog,
        }
    }

    /// Drop the running state and open a fresh one over the same data
    /// directory, as a process restart would.
    pub fn restart(&mut self) {
        self.state = build_state(self.data_dir.path(), Arc::clone(&self.catalog));
    }

    /// Directory the cart snapshot is written to.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// Send a request and decode the JSON response body.
    ///
    /// Non-JSON bodies come back as `Value::Null`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::expect_used)]
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = routes::app(self.state.clone())
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("read body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// `GET` helper.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }
}

fn build_state(data_dir: &Path, catalog: Arc<dyn CatalogSource>) -> AppState {
    let config = StorefrontConfig {
        data_dir: data_dir.to_path_buf(),
        ..StorefrontConfig::default()
    };
    let storage = Arc::new(FileStorage::new(data_dir));
    AppState::new(config, catalog, storage)
}
