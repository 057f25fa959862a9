use async_trait::async_trait;
use giftly_core::repository::FavoriteRepository;
use giftly_core::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::storage_error;

pub struct StoreFavoriteRepository {
    pool: PgPool,
}

impl StoreFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for StoreFavoriteRepository {
    async fn toggle_like(&self, customer_id: &str, product_id: Uuid) -> CoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let removed = sqlx::query("DELETE FROM product_likes WHERE customer_id = $1 AND product_id = $2")
            .bind(customer_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        let liked = removed.rows_affected() == 0;
        if liked {
            sqlx::query(
                "INSERT INTO product_likes (customer_id, product_id) VALUES ($1, $2) \
                 ON CONFLICT (customer_id, product_id) DO NOTHING",
            )
            .bind(customer_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(liked)
    }

    async fn is_liked(&self, customer_id: &str, product_id: Uuid) -> CoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM product_likes WHERE customer_id = $1 AND product_id = $2)",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)
    }

    async fn like_count(&self, product_id: Uuid) -> CoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product_likes WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(count.unsigned_abs())
    }

    async fn list_liked(&self, customer_id: &str, offset: u64, limit: u64) -> CoreResult<(Vec<Uuid>, u64)> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT product_id FROM product_likes WHERE customer_id = $1 \
             ORDER BY created_at DESC, product_id \
             OFFSET $2 LIMIT $3",
        )
        .bind(customer_id)
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product_likes WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok((ids, total.unsigned_abs()))
    }

    async fn forget_product(&self, product_id: Uuid) -> CoreResult<()> {
        // Usually a no-op since rows cascade with the product
        sqlx::query("DELETE FROM product_likes WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}
