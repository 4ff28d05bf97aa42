//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Health check
//! GET    /static/*                - Static assets (images, products.json)
//!
//! # Catalog
//! GET    /api/products            - Product listing (?category=&page=&page_size=)
//! GET    /api/catalog/{category}  - Product listing for one category (?page=&page_size=)
//! GET    /api/categories          - Distinct categories, catalog order
//! GET    /api/products/{id}       - Product detail
//!
//! # Cart
//! GET    /api/cart                - Line items, count and total
//! GET    /api/cart/count          - Count badge
//! POST   /api/cart/items          - Add a product (existing items are left alone)
//! PUT    /api/cart/items/{id}     - Set quantity
//! DELETE /api/cart/items/{id}     - Remove a line item
//! DELETE /api/cart                - Empty the cart (checkout)
//! ```

pub mod cart;
pub mod products;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    routing::{get, post, put},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the full application router: API routes, static assets, health
/// check, request IDs and request tracing.
pub fn app(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", static_dir)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/catalog/{category}", get(products::by_category))
        .route("/categories", get(products::categories))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/count", get(cart::count))
        .route("/cart/items", post(cart::add))
        .route("/cart/items/{id}", put(cart::update).delete(cart::remove))
}

/// Create the main routes router.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", catalog_routes().merge(cart_routes()))
}
