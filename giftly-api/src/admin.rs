use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use giftly_catalog::{
    ensure_valid, preview, PriceTier, PricedProduct, PricingPreview, Product, ProductDraft, ProductFilter,
};
use giftly_shared::models::events::{ProductPricingUpdatedEvent, ProductRemovedEvent};
use giftly_shared::models::StoreEvent;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::products::ListProductsQuery;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Unsaved pricing to preview, possibly malformed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub base_price: Decimal,
    #[serde(default)]
    pub price_tiers: Vec<PriceTier>,
    /// Falls back to the configured sample quantities
    #[serde(default)]
    pub quantities: Vec<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/products", get(list_products).post(create_product))
        .route("/v1/admin/products/{id}", put(update_product).delete(delete_product))
        .route("/v1/admin/pricing/preview", post(preview_pricing))
}

// ============================================================================
// Product Management Handlers
// ============================================================================

/// GET /v1/admin/products
///
/// Same filters as the storefront listing, hidden products included.
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let filter = ProductFilter {
        category: query.category.filter(|c| !c.trim().is_empty()),
        subcategory: query.subcategory.filter(|c| !c.trim().is_empty()),
        search: query.search,
        include_inactive: true,
    };
    Ok(Json(state.products.list_products(&filter).await?))
}

/// POST /v1/admin/products
async fn create_product(
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    check_identity(&draft)?;
    ensure_valid(&draft.pricing)?;

    let mut draft = draft;
    file_under_taxonomy(&state, &mut draft).await?;
    if draft.currency.is_none() {
        draft.currency = Some(state.pricing.currency.clone());
    }
    let product = Product::from_draft(draft);
    state.products.create_product(&product).await?;

    tracing::info!(
        "Product {} ({}) created with {} tiers",
        product.id,
        product.sku,
        product.pricing.price_tiers.len()
    );
    publish_pricing(&state, &product);
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /v1/admin/products/{id}
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>, AppError> {
    check_identity(&draft)?;
    ensure_valid(&draft.pricing)?;

    let mut draft = draft;
    file_under_taxonomy(&state, &mut draft).await?;
    let mut product = state
        .products
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product not found: {}", id)))?;

    let pricing_changed = product.pricing != draft.pricing;
    product.apply_draft(draft);
    state.products.update_product(&product).await?;

    tracing::info!("Product {} updated (pricing changed: {})", id, pricing_changed);
    if pricing_changed {
        publish_pricing(&state, &product);
    }
    Ok(Json(product))
}

/// DELETE /v1/admin/products/{id}
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.products.delete_product(id).await? {
        return Err(AppError::NotFound(format!("Product not found: {}", id)));
    }

    state.favorites.forget_product(id).await?;

    tracing::info!("Product {} deleted", id);
    state.publish(StoreEvent::ProductRemoved(ProductRemovedEvent {
        product_id: id,
        timestamp: Utc::now().timestamp(),
    }));
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Pricing Preview
// ============================================================================

/// POST /v1/admin/pricing/preview
///
/// Never rejects: authoring problems come back alongside the rows.
async fn preview_pricing(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Json<PricingPreview> {
    let pricing = PricedProduct::new(req.base_price, req.price_tiers, 0);
    let quantities = if req.quantities.is_empty() {
        state.pricing.preview_quantities.as_slice()
    } else {
        req.quantities.as_slice()
    };
    Json(preview(&pricing, quantities))
}

fn check_identity(draft: &ProductDraft) -> Result<(), AppError> {
    if draft.sku.trim().is_empty() {
        return Err(AppError::BadRequest("SKU is required".to_string()));
    }
    if draft.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }
    if draft.category.trim().is_empty() {
        return Err(AppError::BadRequest("Category is required".to_string()));
    }
    Ok(())
}

/// The category and any subcategory must already exist; stored names take
/// their canonical spelling.
async fn file_under_taxonomy(state: &AppState, draft: &mut ProductDraft) -> Result<(), AppError> {
    let category = state
        .categories
        .find_category(&draft.category)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {}", draft.category.trim())))?;

    if !draft.subcategory.trim().is_empty() {
        let subcategory = state
            .categories
            .find_subcategory(&category.name, &draft.subcategory)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Unknown subcategory {} in {}",
                    draft.subcategory.trim(),
                    category.name
                ))
            })?;
        draft.subcategory = subcategory.name;
    } else {
        draft.subcategory = String::new();
    }
    draft.category = category.name;
    Ok(())
}

fn publish_pricing(state: &AppState, product: &Product) {
    state.publish(StoreEvent::ProductPricingUpdated(ProductPricingUpdatedEvent {
        product_id: product.id,
        base_price: product.pricing.base_price,
        tier_count: product.pricing.price_tiers.len(),
        timestamp: Utc::now().timestamp(),
    }));
}
