//! Category-filtered product loading with explicit loading/error state.
//!
//! A [`ProductQuery`] moves through `Loading -> Ready | Failed`. It starts in
//! `Loading` and only returns there when the category changes. Each change
//! issues a [`FetchTicket`] tagged with a generation number; outcomes carrying
//! an older generation are dropped, so a slow response for a previous
//! category can never overwrite the current one.

use std::sync::Arc;

use corner_shop_core::Product;
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use super::{CatalogError, CatalogSource, filter_by_category};

/// Where a query is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Loading,
    Ready,
    Failed,
}

/// The (products, loading, error) triple a view renders from.
#[derive(Debug, Clone)]
pub struct ProductsView {
    pub products: Vec<Product>,
    pub loading: bool,
    pub error: Option<Arc<CatalogError>>,
}

/// Handle for one issued fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    category: Option<String>,
}

impl FetchTicket {
    /// Category the fetch filters by.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

struct QueryState {
    generation: u64,
    /// Category of the latest issued ticket; `None` until the first one.
    requested: Option<Option<String>>,
    status: QueryStatus,
    products: Vec<Product>,
    error: Option<Arc<CatalogError>>,
}

/// Loads the catalog through a [`CatalogSource`] and keeps the filtered result.
pub struct ProductQuery {
    source: Arc<dyn CatalogSource>,
    state: Mutex<QueryState>,
}

impl ProductQuery {
    /// Create a query in the `Loading` state. Nothing is fetched until
    /// [`begin`](Self::begin) or [`query`](Self::query) is called.
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            state: Mutex::new(QueryState {
                generation: 0,
                requested: None,
                status: QueryStatus::Loading,
                products: Vec::new(),
                error: None,
            }),
        }
    }

    /// Switch to `category` and enter `Loading`.
    ///
    /// Returns `None` when `category` is the one already requested; there is
    /// then nothing new to fetch. An empty category is treated as none.
    pub fn begin(&self, category: Option<&str>) -> Option<FetchTicket> {
        let category = category.filter(|c| !c.is_empty()).map(str::to_owned);

        let mut state = self.state.lock();
        if state.requested.as_ref() == Some(&category) {
            return None;
        }

        state.generation += 1;
        state.requested = Some(category.clone());
        state.status = QueryStatus::Loading;

        Some(FetchTicket {
            generation: state.generation,
            category,
        })
    }

    /// Fetch the catalog for `ticket` and apply the outcome.
    ///
    /// Returns `false` if the ticket was superseded while the fetch was in
    /// flight and its outcome was discarded.
    #[instrument(skip(self))]
    pub async fn resolve(&self, ticket: FetchTicket) -> bool {
        let outcome = self.source.fetch().await;
        self.apply(ticket, outcome)
    }

    /// Apply a fetch outcome for `ticket`, unless a newer ticket exists.
    ///
    /// On failure the previous products are kept and the error is recorded.
    pub fn apply(&self, ticket: FetchTicket, outcome: Result<Vec<Product>, CatalogError>) -> bool {
        let mut state = self.state.lock();
        if ticket.generation != state.generation {
            debug!(
                stale = ticket.generation,
                current = state.generation,
                "Discarding superseded catalog response"
            );
            return false;
        }

        match outcome {
            Ok(products) => {
                state.products = filter_by_category(products, ticket.category());
                state.error = None;
                state.status = QueryStatus::Ready;
            }
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed");
                state.error = Some(Arc::new(e));
                state.status = QueryStatus::Failed;
            }
        }
        true
    }

    /// Request `category`, wait for the fetch if one was issued, and return
    /// the resulting view.
    pub async fn query(&self, category: Option<&str>) -> ProductsView {
        if let Some(ticket) = self.begin(category) {
            self.resolve(ticket).await;
        }
        self.snapshot()
    }

    /// Current (products, loading, error) triple.
    #[must_use]
    pub fn snapshot(&self) -> ProductsView {
        let state = self.state.lock();
        ProductsView {
            products: state.products.clone(),
            loading: state.status == QueryStatus::Loading,
            error: state.error.clone(),
        }
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> QueryStatus {
        self.state.lock().status
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use corner_shop_core::{Price, ProductId};

    use super::*;
    use crate::catalog::StaticCatalogSource;

    fn product(id: i32, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_cents(100),
            image: String::new(),
            description: String::new(),
            category: category.to_string(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![product(1, "A"), product(2, "B")]
    }

    fn query_over_catalog() -> ProductQuery {
        ProductQuery::new(Arc::new(StaticCatalogSource::new(catalog())))
    }

    struct FailingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for FailingSource {
        async fn fetch(&self) -> Result<Vec<Product>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CatalogError::Status(500))
        }
    }

    #[test]
    fn test_starts_loading() {
        let query = query_over_catalog();
        assert_eq!(query.status(), QueryStatus::Loading);
        let view = query.snapshot();
        assert!(view.loading);
        assert!(view.products.is_empty());
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_query_filters_by_category() {
        let query = query_over_catalog();
        let view = query.query(Some("A")).await;
        assert!(!view.loading);
        assert_eq!(view.products, vec![product(1, "A")]);
        assert_eq!(query.status(), QueryStatus::Ready);
    }

    #[tokio::test]
    async fn test_query_without_category_returns_all() {
        let query = query_over_catalog();
        let view = query.query(None).await;
        assert_eq!(view.products, catalog());
    }

    #[tokio::test]
    async fn test_category_change_refetches() {
        let query = query_over_catalog();
        query.query(Some("A")).await;
        let view = query.query(Some("B")).await;
        assert_eq!(view.products, vec![product(2, "B")]);
    }

    #[test]
    fn test_same_category_issues_no_new_fetch() {
        let query = query_over_catalog();
        assert!(query.begin(Some("A")).is_some());
        assert!(query.begin(Some("A")).is_none());
        assert!(query.begin(None).is_some());
        assert!(query.begin(Some("")).is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let query = query_over_catalog();
        let first = query.begin(Some("A")).unwrap();
        let second = query.begin(Some("B")).unwrap();

        // Newer request resolves first, then the stale one arrives.
        assert!(query.apply(second, Ok(catalog())));
        assert!(!query.apply(first, Ok(catalog())));

        assert_eq!(query.snapshot().products, vec![product(2, "B")]);
        assert_eq!(query.status(), QueryStatus::Ready);
    }

    #[test]
    fn test_stale_response_does_not_end_loading() {
        let query = query_over_catalog();
        let first = query.begin(Some("A")).unwrap();
        let _second = query.begin(Some("B")).unwrap();

        assert!(!query.apply(first, Ok(catalog())));
        assert!(query.snapshot().loading);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_products() {
        let query = query_over_catalog();
        query.query(Some("A")).await;

        let ticket = query.begin(Some("B")).unwrap();
        query.apply(ticket, Err(CatalogError::Status(502)));

        let view = query.snapshot();
        assert!(!view.loading);
        assert!(matches!(
            view.error.as_deref(),
            Some(CatalogError::Status(502))
        ));
        assert_eq!(view.products, vec![product(1, "A")]);
        assert_eq!(query.status(), QueryStatus::Failed);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_retried() {
        let source = Arc::new(FailingSource {
            calls: AtomicUsize::new(0),
        });
        let query = ProductQuery::new(source.clone());

        let view = query.query(None).await;
        assert!(view.error.is_some());
        assert!(view.products.is_empty());

        query.query(None).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let query = query_over_catalog();
        let ticket = query.begin(Some("A")).unwrap();
        query.apply(ticket, Err(CatalogError::Status(500)));

        let view = query.query(Some("B")).await;
        assert!(view.error.is_none());
        assert_eq!(view.products, vec![product(2, "B")]);
    }
}
