use async_trait::async_trait;
use chrono::{DateTime, Utc};
use giftly_catalog::{PriceTier, PricedProduct, Product, ProductFilter};
use giftly_core::repository::ProductRepository;
use giftly_core::{CoreError, CoreResult};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::storage_error;

const PRODUCT_COLUMNS: &str = "id, sku, name, description, category, subcategory, images, is_active, \
     currency, base_price, price_tiers, quantity_available, created_at, updated_at";

pub struct StoreProductRepository {
    pool: PgPool,
}

impl StoreProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    sku: String,
    name: String,
    description: String,
    category: String,
    subcategory: String,
    images: Json<Vec<String>>,
    is_active: bool,
    currency: String,
    base_price: Decimal,
    price_tiers: Json<Vec<PriceTier>>,
    quantity_available: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            category: row.category,
            subcategory: row.subcategory,
            images: row.images.0,
            is_active: row.is_active,
            currency: row.currency,
            pricing: PricedProduct {
                base_price: row.base_price,
                price_tiers: row.price_tiers.0,
                // Stock is never negative in the table; clamp rather than fail a read
                quantity_available: u32::try_from(row.quantity_available.max(0)).unwrap_or(u32::MAX),
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn sku_conflict(err: sqlx::Error, sku: &str) -> CoreError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            CoreError::Conflict(format!("SKU already exists: {}", sku))
        }
        _ => storage_error(err),
    }
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn create_product(&self, product: &Product) -> CoreResult<Uuid> {
        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, description, category, subcategory, images, is_active,
                                  currency, base_price, price_tiers, quantity_available, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(Json(&product.images))
        .bind(product.is_active)
        .bind(&product.currency)
        .bind(product.pricing.base_price)
        .bind(Json(&product.pricing.price_tiers))
        .bind(i64::from(product.pricing.quantity_available))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| sku_conflict(e, &product.sku))?;

        Ok(product.id)
    }

    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Product::from))
    }

    async fn list_products(&self, filter: &ProductFilter) -> CoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products \
             WHERE ($1::TEXT IS NULL OR lower(category) = lower($1)) \
               AND ($2::TEXT IS NULL OR lower(subcategory) = lower($2)) \
               AND ($3 OR is_active) \
             ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .bind(filter.category.as_deref())
        .bind(filter.subcategory.as_deref())
        .bind(filter.include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        // Text search runs in Rust so every backend matches the same way
        Ok(rows
            .into_iter()
            .map(Product::from)
            .filter(|product| filter.matches(product))
            .collect())
    }

    async fn update_product(&self, product: &Product) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET sku = $1, name = $2, description = $3, category = $4, subcategory = $5, images = $6,
                is_active = $7, currency = $8, base_price = $9, price_tiers = $10,
                quantity_available = $11, updated_at = $12
            WHERE id = $13
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(Json(&product.images))
        .bind(product.is_active)
        .bind(&product.currency)
        .bind(product.pricing.base_price)
        .bind(Json(&product.pricing.price_tiers))
        .bind(i64::from(product.pricing.quantity_available))
        .bind(product.updated_at)
        .bind(product.id)
        .execute(&self.pool)
        .await
        .map_err(|e| sku_conflict(e, &product.sku))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("product {}", product.id)));
        }
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
