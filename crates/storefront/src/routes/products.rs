//! Product listing and detail handlers.
//!
//! Every handler loads the catalog through a [`ProductQuery`] of its own, so
//! listing, detail and category requests share one failure path: a catalog
//! error is answered with `502`. The query lives for a single request, which
//! never supersedes its own ticket.
//!
//! [`ProductQuery`]: crate::catalog::ProductQuery

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use corner_shop_core::{Price, Product, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::{self, Page, PageRequest};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub price_display: String,
    pub image: String,
    pub description: String,
    pub category: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            price_display: product.price.display(),
            image: product.image.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// List products, optionally filtered by `?category=`.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<Page<ProductView>>> {
    let Query(query) = query?;
    let request = PageRequest::new(query.page, query.page_size)?;
    list(&state, query.category.as_deref(), request).await
}

/// List the products in one category.
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    category: std::result::Result<Path<String>, PathRejection>,
    query: std::result::Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<Json<Page<ProductView>>> {
    let Path(category) = category?;
    let Query(query) = query?;
    let request = PageRequest::new(query.page, query.page_size)?;
    list(&state, Some(&category), request).await
}

/// Products in `category` (all products for `None`), or the catalog error.
async fn load(state: &AppState, category: Option<&str>) -> Result<Vec<Product>> {
    let view = state.product_query().query(category).await;
    match view.error {
        Some(error) => Err(error.into()),
        None => Ok(view.products),
    }
}

async fn list(
    state: &AppState,
    category: Option<&str>,
    request: PageRequest,
) -> Result<Json<Page<ProductView>>> {
    let products = load(state, category).await?;
    let views = products.iter().map(ProductView::from).collect();
    Ok(Json(Page::slice(views, request)))
}

/// Distinct categories in catalog order.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let products = load(&state, None).await?;
    Ok(Json(catalog::categories(&products)))
}

/// Display a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<ProductView>> {
    let Path(id) = id?;
    let products = load(&state, None).await?;
    catalog::find_product(&products, id)
        .map(|product| Json(ProductView::from(product)))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
