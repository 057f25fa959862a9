use std::sync::Arc;

use giftly_core::repository::{FavoriteRepository, ProductRepository};
use giftly_core::CoreError;
use uuid::Uuid;

use crate::models::{LikeStatus, LikedProducts, MAX_PAGE_SIZE};

/// Customer likes on catalog products
pub struct FavoriteService {
    products: Arc<dyn ProductRepository>,
    favorites: Arc<dyn FavoriteRepository>,
}

impl FavoriteService {
    pub fn new(products: Arc<dyn ProductRepository>, favorites: Arc<dyn FavoriteRepository>) -> Self {
        Self { products, favorites }
    }

    pub async fn status(&self, customer_id: &str, product_id: Uuid) -> Result<LikeStatus, FavoriteError> {
        self.products
            .get_product(product_id)
            .await?
            .ok_or(FavoriteError::ProductNotFound(product_id))?;
        self.current_status(customer_id, product_id).await
    }

    /// Like or unlike. Only active products can gain likes; an existing like
    /// on a hidden product can still be removed.
    pub async fn toggle(&self, customer_id: &str, product_id: Uuid) -> Result<LikeStatus, FavoriteError> {
        let product = self
            .products
            .get_product(product_id)
            .await?
            .ok_or(FavoriteError::ProductNotFound(product_id))?;

        if !product.is_active && !self.favorites.is_liked(customer_id, product_id).await? {
            return Err(FavoriteError::ProductUnavailable(product_id));
        }

        let liked = self.favorites.toggle_like(customer_id, product_id).await?;
        tracing::debug!(
            "{} {} product {}",
            customer_id,
            if liked { "liked" } else { "unliked" },
            product_id
        );
        self.current_status(customer_id, product_id).await
    }

    /// `page` starts at 1; `limit` is capped at `MAX_PAGE_SIZE`. Likes on
    /// products that are gone or hidden are left out of the page.
    pub async fn liked_products(
        &self,
        customer_id: &str,
        page: u64,
        limit: u64,
    ) -> Result<LikedProducts, FavoriteError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(limit);

        let (ids, total) = self.favorites.list_liked(customer_id, offset, limit).await?;
        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            match self.products.get_product(id).await? {
                Some(product) if product.is_active => products.push(product),
                _ => tracing::debug!("Skipping liked product {} that is no longer listed", id),
            }
        }

        Ok(LikedProducts {
            products,
            total,
            page,
            limit,
        })
    }

    /// Called when a product is deleted from the catalog
    pub async fn forget_product(&self, product_id: Uuid) -> Result<(), FavoriteError> {
        Ok(self.favorites.forget_product(product_id).await?)
    }

    async fn current_status(&self, customer_id: &str, product_id: Uuid) -> Result<LikeStatus, FavoriteError> {
        Ok(LikeStatus {
            is_liked: self.favorites.is_liked(customer_id, product_id).await?,
            like_count: self.favorites.like_count(product_id).await?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FavoriteError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Product is not available: {0}")]
    ProductUnavailable(Uuid),

    #[error(transparent)]
    Storage(#[from] CoreError),
}
