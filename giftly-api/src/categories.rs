use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use giftly_catalog::{Category, CategoryDraft, ProductFilter, SubCategory, SubCategoryDraft};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubCategoryQuery {
    pub category: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/categories", get(list_categories).post(create_category))
        .route("/v1/admin/categories/{id}", delete(delete_category))
        .route("/v1/admin/subcategories", get(list_subcategories).post(create_subcategory))
        .route("/v1/admin/subcategories/{id}", delete(delete_subcategory))
}

// ============================================================================
// Categories
// ============================================================================

/// GET /v1/admin/categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.categories.list_categories().await?))
}

/// POST /v1/admin/categories
async fn create_category(
    State(state): State<AppState>,
    Json(draft): Json<CategoryDraft>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = Category::from_draft(draft)?;
    state.categories.create_category(&category).await?;

    tracing::info!("Category {} created", category.name);
    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /v1/admin/categories/{id}
///
/// Refused while products or subcategories still use the category.
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let category = state
        .categories
        .get_category(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category not found: {}", id)))?;

    let in_use = count_products(&state, &category.name, None).await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Category {} is used by {} products",
            category.name, in_use
        )));
    }
    if !state
        .categories
        .list_subcategories(Some(&category.name))
        .await?
        .is_empty()
    {
        return Err(AppError::Conflict(format!(
            "Category {} still has subcategories",
            category.name
        )));
    }

    state.categories.delete_category(id).await?;
    tracing::info!("Category {} deleted", category.name);
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Subcategories
// ============================================================================

/// GET /v1/admin/subcategories?category=
async fn list_subcategories(
    State(state): State<AppState>,
    Query(query): Query<SubCategoryQuery>,
) -> Result<Json<Vec<SubCategory>>, AppError> {
    let category = query.category.as_deref().filter(|c| !c.trim().is_empty());
    Ok(Json(state.categories.list_subcategories(category).await?))
}

/// POST /v1/admin/subcategories
async fn create_subcategory(
    State(state): State<AppState>,
    Json(draft): Json<SubCategoryDraft>,
) -> Result<(StatusCode, Json<SubCategory>), AppError> {
    let mut subcategory = SubCategory::from_draft(draft)?;
    let parent = state
        .categories
        .find_category(&subcategory.category)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(format!("Unknown category: {}", subcategory.category))
        })?;
    subcategory.category = parent.name;
    state.categories.create_subcategory(&subcategory).await?;

    tracing::info!("Subcategory {} / {} created", subcategory.category, subcategory.name);
    Ok((StatusCode::CREATED, Json(subcategory)))
}

/// DELETE /v1/admin/subcategories/{id}
async fn delete_subcategory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let subcategory = state
        .categories
        .get_subcategory(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subcategory not found: {}", id)))?;

    let in_use = count_products(&state, &subcategory.category, Some(&subcategory.name)).await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "Subcategory {} is used by {} products",
            subcategory.name, in_use
        )));
    }

    state.categories.delete_subcategory(id).await?;
    tracing::info!("Subcategory {} / {} deleted", subcategory.category, subcategory.name);
    Ok(StatusCode::NO_CONTENT)
}

/// Products filed under the category, hidden ones included
async fn count_products(
    state: &AppState,
    category: &str,
    subcategory: Option<&str>,
) -> Result<usize, AppError> {
    let filter = ProductFilter {
        category: Some(category.to_string()),
        subcategory: subcategory.map(str::to_string),
        search: None,
        include_inactive: true,
    };
    Ok(state.products.list_products(&filter).await?.len())
}
