//! Cart route handlers.
//!
//! The cart lives in `AppState`; every handler locks it for a single
//! operation and answers with the full cart view, so clients never need a
//! second request to refresh totals.
//!
//! Malformed paths and bodies are answered with `400` and the usual JSON
//! error body rather than axum's plain-text rejections.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use corner_shop_core::{CartLineItem, Price, ProductId, Quantity};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::CartStore;
use crate::catalog;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Cart item display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: Price,
    pub price_display: String,
    pub line_total: Price,
    pub line_total_display: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub count: usize,
    pub total: Price,
    pub total_display: String,
}

/// Cart count badge data.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCountView {
    pub count: usize,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartLineItem> for CartItemView {
    fn from(item: &CartLineItem) -> Self {
        let line_total = item.line_total();
        Self {
            id: item.id,
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity.get(),
            price: item.price,
            price_display: item.price.display(),
            line_total,
            line_total_display: line_total.display(),
        }
    }
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        let total = cart.total();
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            count: cart.count(),
            total,
            total_display: total.display(),
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub id: ProductId,
    pub quantity: Option<u32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

fn parse_quantity(value: u32) -> Result<Quantity> {
    Quantity::new(value).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Display the cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::from(&*state.cart().lock()))
}

/// Cart count badge.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Json<CartCountView> {
    Json(CartCountView {
        count: state.cart().lock().count(),
    })
}

/// Add a catalog product to the cart.
///
/// Answers `201 Created` when a line item was added and `200 OK` when the
/// product was already in the cart (its quantity is left as is).
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CartView>)> {
    let Json(request) = payload?;
    let quantity = parse_quantity(request.quantity.unwrap_or(1))?;

    let view = state.product_query().query(None).await;
    if let Some(error) = view.error {
        return Err(error.into());
    }
    let product = catalog::find_product(&view.products, request.id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.id)))?;

    let mut cart = state.cart().lock();
    let added = cart.add_product(product, quantity)?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(CartView::from(&*cart))))
}

/// Set the quantity of a line item. Unknown items are ignored.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
    payload: std::result::Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let quantity = parse_quantity(request.quantity)?;

    let mut cart = state.cart().lock();
    cart.update_quantity(id, quantity)?;
    Ok(Json(CartView::from(&*cart)))
}

/// Remove a line item. Unknown items are ignored.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<CartView>> {
    let Path(id) = id?;
    let mut cart = state.cart().lock();
    cart.remove_item(id)?;
    Ok(Json(CartView::from(&*cart)))
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<Json<CartView>> {
    let mut cart = state.cart().lock();
    cart.clear()?;
    Ok(Json(CartView::from(&*cart)))
}
