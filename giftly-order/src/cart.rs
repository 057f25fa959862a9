use std::collections::HashMap;
use std::sync::Arc;

use giftly_catalog::inventory::is_within_stock;
use giftly_catalog::{InventoryError, Product};
use giftly_core::repository::{CartRepository, ProductRepository};
use giftly_core::{Cart, CartItem, CoreError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Server-side cart operations. Every price written here comes from the
/// catalog resolver, never from the caller.
///
/// Changes to one customer's cart are serialized within this process.
pub struct CartService {
    products: Arc<dyn ProductRepository>,
    carts: Arc<dyn CartRepository>,
    currency: String,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CartService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        carts: Arc<dyn CartRepository>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            products,
            carts,
            currency: currency.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_cart(&self, customer_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Drop entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(customer_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// The customer's cart, or a fresh empty one (not persisted until modified)
    pub async fn get_cart(&self, customer_id: &str) -> Result<Cart, CartError> {
        Ok(self
            .carts
            .get_cart(customer_id)
            .await?
            .unwrap_or_else(|| Cart::new(customer_id, self.currency.clone())))
    }

    /// Add `quantity` units of a product. A product already in the cart is
    /// merged into its existing line and repriced at the combined quantity.
    pub async fn add_item(
        &self,
        customer_id: &str,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        let product = self.load_product(product_id).await?;
        let _guard = self.lock_cart(customer_id).await;
        let mut cart = self.get_cart(customer_id).await?;

        match cart.item_for_product_mut(&product_id) {
            Some(item) => {
                let merged = i64::from(item.quantity).saturating_add(quantity);
                log_clamp(&product, merged);
                let quote = product.quote_for_order(merged)?;
                item.reprice(&quote);
            }
            None => {
                log_clamp(&product, quantity);
                let quote = product.quote_for_order(quantity)?;
                cart.push_item(CartItem::from_quote(&product, &quote));
            }
        }
        cart.recalculate();

        self.carts.save_cart(&cart).await?;
        tracing::info!(
            "Cart {} for {}: added product {} ({} lines, total {})",
            cart.id,
            customer_id,
            product_id,
            cart.items.len(),
            cart.total_amount
        );
        Ok(cart)
    }

    /// Change a line's quantity and reprice it against the current tiers
    pub async fn update_item(
        &self,
        customer_id: &str,
        item_id: Uuid,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        let _guard = self.lock_cart(customer_id).await;
        let mut cart = self.get_cart(customer_id).await?;
        let product_id = cart
            .item_mut(&item_id)
            .map(|item| item.product_id)
            .ok_or(CartError::ItemNotFound(item_id))?;

        let product = self.load_product(product_id).await?;
        log_clamp(&product, quantity);
        let quote = product.quote_for_order(quantity)?;

        if let Some(item) = cart.item_mut(&item_id) {
            item.reprice(&quote);
        }
        cart.recalculate();

        self.carts.save_cart(&cart).await?;
        Ok(cart)
    }

    pub async fn remove_item(&self, customer_id: &str, item_id: Uuid) -> Result<Cart, CartError> {
        let _guard = self.lock_cart(customer_id).await;
        let mut cart = self.get_cart(customer_id).await?;
        cart.remove_item(&item_id)
            .ok_or(CartError::ItemNotFound(item_id))?;

        self.carts.save_cart(&cart).await?;
        Ok(cart)
    }

    pub async fn clear(&self, customer_id: &str) -> Result<Cart, CartError> {
        let _guard = self.lock_cart(customer_id).await;
        self.carts.delete_cart(customer_id).await?;
        Ok(Cart::new(customer_id, self.currency.clone()))
    }

    async fn load_product(&self, product_id: Uuid) -> Result<Product, CartError> {
        let product = self
            .products
            .get_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        if !product.is_active {
            return Err(CartError::ProductUnavailable(product_id));
        }
        Ok(product)
    }
}

fn log_clamp(product: &Product, requested: i64) {
    if !is_within_stock(requested, product.pricing.quantity_available) {
        tracing::debug!(
            "Clamping quantity {} for product {} (available {})",
            requested,
            product.id,
            product.pricing.quantity_available
        );
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Product is not available for purchase: {0}")]
    ProductUnavailable(Uuid),

    #[error("Cart item not found: {0}")]
    ItemNotFound(Uuid),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Storage(#[from] CoreError),
}
