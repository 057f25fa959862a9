use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use giftly_catalog::inventory::clamp_to_minimum;
use giftly_catalog::{PriceTier, Product, ProductFilter};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub quantity: Option<i64>,
}

/// Authoritative price for one product at one quantity
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub applied_tier: Option<PriceTier>,
    pub currency: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(list_products))
        .route("/v1/products/{id}", get(get_product))
        .route("/v1/products/{id}/price", get(get_price))
}

/// GET /v1/products
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = ProductFilter {
        category: query.category.filter(|c| !c.trim().is_empty()),
        subcategory: query.subcategory.filter(|c| !c.trim().is_empty()),
        search: query.search,
        include_inactive: false,
    };
    let products = state
        .products
        .list_products(&filter)
        .await?
        .into_iter()
        .map(with_display_tiers)
        .collect();
    Ok(Json(products))
}

/// GET /v1/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    let product = load_active(&state, id).await?;
    Ok(Json(with_display_tiers(product)))
}

/// GET /v1/products/{id}/price?quantity=N
async fn get_price(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, AppError> {
    let product = load_active(&state, id).await?;
    let quantity = clamp_to_minimum(query.quantity.unwrap_or(1));
    let quote = product.pricing.quote(quantity);

    tracing::debug!(
        "Priced product {} at quantity {}: {} ({})",
        id,
        quantity,
        quote.unit_price,
        if quote.matched_tier.is_some() { "tier" } else { "base" }
    );

    Ok(Json(PriceResponse {
        price: quote.unit_price,
        quantity: quote.quantity,
        total: quote.total,
        applied_tier: quote.matched_tier,
        currency: product.currency,
    }))
}

async fn load_active(state: &AppState, id: Uuid) -> Result<Product, AppError> {
    state
        .products
        .get_product(id)
        .await?
        .filter(|product| product.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Product not found: {}", id)))
}

pub(crate) fn with_display_tiers(mut product: Product) -> Product {
    product.pricing.price_tiers = product.pricing.display_tiers();
    product
}
