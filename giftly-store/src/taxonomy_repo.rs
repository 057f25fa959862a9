use async_trait::async_trait;
use chrono::{DateTime, Utc};
use giftly_catalog::{Category, SubCategory};
use giftly_core::repository::CategoryRepository;
use giftly_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::storage_error;

pub struct StoreCategoryRepository {
    pool: PgPool,
}

impl StoreCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubCategoryRow {
    id: Uuid,
    category: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubCategoryRow> for SubCategory {
    fn from(row: SubCategoryRow) -> Self {
        SubCategory {
            id: row.id,
            category: row.category,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn name_conflict(err: sqlx::Error, what: String) -> CoreError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => CoreError::Conflict(format!("{} already exists", what)),
        _ => storage_error(err),
    }
}

#[async_trait]
impl CategoryRepository for StoreCategoryRepository {
    async fn create_category(&self, category: &Category) -> CoreResult<()> {
        sqlx::query("INSERT INTO categories (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .bind(category.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| name_conflict(e, format!("Category {}", category.name)))?;
        Ok(())
    }

    async fn get_category(&self, id: Uuid) -> CoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Category::from))
    }

    async fn find_category(&self, name: &str) -> CoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE lower(name) = lower($1)",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Category::from))
    }

    async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn delete_category(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_subcategory(&self, subcategory: &SubCategory) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO subcategories (id, category, name, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(subcategory.id)
        .bind(&subcategory.category)
        .bind(&subcategory.name)
        .bind(subcategory.created_at)
        .bind(subcategory.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            name_conflict(
                e,
                format!("Subcategory {} / {}", subcategory.category, subcategory.name),
            )
        })?;
        Ok(())
    }

    async fn get_subcategory(&self, id: Uuid) -> CoreResult<Option<SubCategory>> {
        let row = sqlx::query_as::<_, SubCategoryRow>(
            "SELECT id, category, name, created_at, updated_at FROM subcategories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(SubCategory::from))
    }

    async fn find_subcategory(&self, category: &str, name: &str) -> CoreResult<Option<SubCategory>> {
        let row = sqlx::query_as::<_, SubCategoryRow>(
            "SELECT id, category, name, created_at, updated_at FROM subcategories \
             WHERE lower(category) = lower($1) AND lower(name) = lower($2)",
        )
        .bind(category.trim())
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(SubCategory::from))
    }

    async fn list_subcategories(&self, category: Option<&str>) -> CoreResult<Vec<SubCategory>> {
        let rows = sqlx::query_as::<_, SubCategoryRow>(
            "SELECT id, category, name, created_at, updated_at FROM subcategories \
             WHERE ($1::TEXT IS NULL OR lower(category) = lower($1)) \
             ORDER BY category, name",
        )
        .bind(category.map(str::trim))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(SubCategory::from).collect())
    }

    async fn delete_subcategory(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
