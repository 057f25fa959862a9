use async_trait::async_trait;
use giftly_catalog::{Category, Product, ProductFilter, SubCategory};
use uuid::Uuid;

use crate::cart::Cart;
use crate::proposal::Proposal;
use crate::CoreResult;

/// Repository trait for product catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: &Product) -> CoreResult<Uuid>;

    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>>;

    async fn list_products(&self, filter: &ProductFilter) -> CoreResult<Vec<Product>>;

    /// Fails with `CoreError::NotFound` when the product does not exist
    async fn update_product(&self, product: &Product) -> CoreResult<()>;

    /// Returns whether a product was deleted
    async fn delete_product(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for carts, one per customer
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn get_cart(&self, customer_id: &str) -> CoreResult<Option<Cart>>;

    async fn save_cart(&self, cart: &Cart) -> CoreResult<()>;

    async fn delete_cart(&self, customer_id: &str) -> CoreResult<()>;
}

/// Repository trait for proposal data access
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Insert or replace
    async fn save_proposal(&self, proposal: &Proposal) -> CoreResult<()>;

    async fn get_proposal(&self, id: Uuid) -> CoreResult<Option<Proposal>>;

    /// Newest first
    async fn list_proposals(&self, customer_id: &str) -> CoreResult<Vec<Proposal>>;

    async fn delete_proposal(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for the category tree. Names are unique ignoring case:
/// category names globally, subcategory names within their category.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Fails with `CoreError::Conflict` when the name is taken
    async fn create_category(&self, category: &Category) -> CoreResult<()>;

    async fn get_category(&self, id: Uuid) -> CoreResult<Option<Category>>;

    async fn find_category(&self, name: &str) -> CoreResult<Option<Category>>;

    /// Sorted by name
    async fn list_categories(&self) -> CoreResult<Vec<Category>>;

    async fn delete_category(&self, id: Uuid) -> CoreResult<bool>;

    /// Fails with `CoreError::Conflict` when the category already has one by that name
    async fn create_subcategory(&self, subcategory: &SubCategory) -> CoreResult<()>;

    async fn get_subcategory(&self, id: Uuid) -> CoreResult<Option<SubCategory>>;

    async fn find_subcategory(&self, category: &str, name: &str) -> CoreResult<Option<SubCategory>>;

    /// Sorted by category then name; `None` lists every category's
    async fn list_subcategories(&self, category: Option<&str>) -> CoreResult<Vec<SubCategory>>;

    async fn delete_subcategory(&self, id: Uuid) -> CoreResult<bool>;
}

/// Repository trait for customer likes
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Flip the like; returns whether the product is now liked
    async fn toggle_like(&self, customer_id: &str, product_id: Uuid) -> CoreResult<bool>;

    async fn is_liked(&self, customer_id: &str, product_id: Uuid) -> CoreResult<bool>;

    async fn like_count(&self, product_id: Uuid) -> CoreResult<u64>;

    /// A page of liked product ids, most recently liked first, and the
    /// customer's total number of likes
    async fn list_liked(&self, customer_id: &str, offset: u64, limit: u64) -> CoreResult<(Vec<Uuid>, u64)>;

    /// Drop every like of a removed product
    async fn forget_product(&self, product_id: Uuid) -> CoreResult<()>;
}
