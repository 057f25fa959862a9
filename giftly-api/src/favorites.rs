use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use giftly_order::models::DEFAULT_PAGE_SIZE;
use giftly_order::{LikeStatus, LikedProducts};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CustomerId;
use crate::products::with_display_tiers;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn first_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// Routes here expect `customer_middleware` to have run
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/likes/products/{id}/status", get(like_status))
        .route("/v1/likes/products/{id}/toggle", post(toggle_like))
        .route("/v1/likes/user/liked-products", get(liked_products))
}

/// GET /v1/likes/products/{id}/status
async fn like_status(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeStatus>, AppError> {
    Ok(Json(state.favorites.status(customer.as_str(), id).await?))
}

/// POST /v1/likes/products/{id}/toggle
async fn toggle_like(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeStatus>, AppError> {
    Ok(Json(state.favorites.toggle(customer.as_str(), id).await?))
}

/// GET /v1/likes/user/liked-products?page=&limit=
async fn liked_products(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<LikedProducts>, AppError> {
    let mut liked = state
        .favorites
        .liked_products(customer.as_str(), query.page, query.limit)
        .await?;
    liked.products = liked.products.into_iter().map(with_display_tiers).collect();
    Ok(Json(liked))
}
