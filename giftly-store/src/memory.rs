//! In-process repositories, used when no database is configured and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use giftly_catalog::taxonomy::same_name;
use giftly_catalog::{Category, Product, ProductFilter, SubCategory};
use giftly_core::repository::{
    CartRepository, CategoryRepository, FavoriteRepository, ProductRepository, ProposalRepository,
};
use giftly_core::{Cart, CoreError, CoreResult, Proposal};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sku_taken(products: &HashMap<Uuid, Product>, product: &Product) -> bool {
    products
        .values()
        .any(|existing| existing.sku == product.sku && existing.id != product.id)
}

fn sku_conflict(sku: &str) -> CoreError {
    CoreError::Conflict(format!("SKU already exists: {}", sku))
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create_product(&self, product: &Product) -> CoreResult<Uuid> {
        let mut products = self.products.write().await;
        if sku_taken(&products, product) {
            return Err(sku_conflict(&product.sku));
        }
        products.insert(product.id, product.clone());
        Ok(product.id)
    }

    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> CoreResult<Vec<Product>> {
        let mut matching: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }

    async fn update_product(&self, product: &Product) -> CoreResult<()> {
        let mut products = self.products.write().await;
        if sku_taken(&products, product) {
            return Err(sku_conflict(&product.sku));
        }
        match products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound(format!("product {}", product.id))),
        }
    }

    async fn delete_product(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<HashMap<String, Cart>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn get_cart(&self, customer_id: &str) -> CoreResult<Option<Cart>> {
        Ok(self.carts.read().await.get(customer_id).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> CoreResult<()> {
        self.carts
            .write()
            .await
            .insert(cart.customer_id.clone(), cart.clone());
        Ok(())
    }

    async fn delete_cart(&self, customer_id: &str) -> CoreResult<()> {
        self.carts.write().await.remove(customer_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProposalRepository {
    proposals: RwLock<HashMap<Uuid, Proposal>>,
}

impl InMemoryProposalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProposalRepository for InMemoryProposalRepository {
    async fn save_proposal(&self, proposal: &Proposal) -> CoreResult<()> {
        self.proposals
            .write()
            .await
            .insert(proposal.id, proposal.clone());
        Ok(())
    }

    async fn get_proposal(&self, id: Uuid) -> CoreResult<Option<Proposal>> {
        Ok(self.proposals.read().await.get(&id).cloned())
    }

    async fn list_proposals(&self, customer_id: &str) -> CoreResult<Vec<Proposal>> {
        let mut owned: Vec<Proposal> = self
            .proposals
            .read()
            .await
            .values()
            .filter(|proposal| proposal.customer_id == customer_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn delete_proposal(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.proposals.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<HashMap<Uuid, Category>>,
    subcategories: RwLock<HashMap<Uuid, SubCategory>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create_category(&self, category: &Category) -> CoreResult<()> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|existing| same_name(&existing.name, &category.name)) {
            return Err(CoreError::Conflict(format!(
                "Category already exists: {}",
                category.name
            )));
        }
        categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn get_category(&self, id: Uuid) -> CoreResult<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn find_category(&self, name: &str) -> CoreResult<Option<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|category| same_name(&category.name, name))
            .cloned())
    }

    async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.categories.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn delete_category(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.categories.write().await.remove(&id).is_some())
    }

    async fn create_subcategory(&self, subcategory: &SubCategory) -> CoreResult<()> {
        let mut subcategories = self.subcategories.write().await;
        let taken = subcategories.values().any(|existing| {
            existing.belongs_to(&subcategory.category) && same_name(&existing.name, &subcategory.name)
        });
        if taken {
            return Err(CoreError::Conflict(format!(
                "Subcategory already exists: {} / {}",
                subcategory.category, subcategory.name
            )));
        }
        subcategories.insert(subcategory.id, subcategory.clone());
        Ok(())
    }

    async fn get_subcategory(&self, id: Uuid) -> CoreResult<Option<SubCategory>> {
        Ok(self.subcategories.read().await.get(&id).cloned())
    }

    async fn find_subcategory(&self, category: &str, name: &str) -> CoreResult<Option<SubCategory>> {
        Ok(self
            .subcategories
            .read()
            .await
            .values()
            .find(|sub| sub.belongs_to(category) && same_name(&sub.name, name))
            .cloned())
    }

    async fn list_subcategories(&self, category: Option<&str>) -> CoreResult<Vec<SubCategory>> {
        let mut subcategories: Vec<SubCategory> = self
            .subcategories
            .read()
            .await
            .values()
            .filter(|sub| category.map_or(true, |category| sub.belongs_to(category)))
            .cloned()
            .collect();
        subcategories.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        Ok(subcategories)
    }

    async fn delete_subcategory(&self, id: Uuid) -> CoreResult<bool> {
        Ok(self.subcategories.write().await.remove(&id).is_some())
    }
}

/// Likes in the order they were made
#[derive(Default)]
pub struct InMemoryFavoriteRepository {
    likes: RwLock<Vec<(String, Uuid)>>,
}

impl InMemoryFavoriteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryFavoriteRepository {
    async fn toggle_like(&self, customer_id: &str, product_id: Uuid) -> CoreResult<bool> {
        let mut likes = self.likes.write().await;
        match likes
            .iter()
            .position(|(customer, product)| customer == customer_id && *product == product_id)
        {
            Some(index) => {
                likes.remove(index);
                Ok(false)
            }
            None => {
                likes.push((customer_id.to_string(), product_id));
                Ok(true)
            }
        }
    }

    async fn is_liked(&self, customer_id: &str, product_id: Uuid) -> CoreResult<bool> {
        Ok(self
            .likes
            .read()
            .await
            .iter()
            .any(|(customer, product)| customer == customer_id && *product == product_id))
    }

    async fn like_count(&self, product_id: Uuid) -> CoreResult<u64> {
        let likes = self.likes.read().await;
        Ok(likes.iter().filter(|(_, product)| *product == product_id).count() as u64)
    }

    async fn list_liked(&self, customer_id: &str, offset: u64, limit: u64) -> CoreResult<(Vec<Uuid>, u64)> {
        let likes = self.likes.read().await;
        let owned: Vec<Uuid> = likes
            .iter()
            .rev()
            .filter(|(customer, _)| customer == customer_id)
            .map(|(_, product)| *product)
            .collect();
        let total = owned.len() as u64;
        let page = owned
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn forget_product(&self, product_id: Uuid) -> CoreResult<()> {
        self.likes
            .write()
            .await
            .retain(|(_, product)| *product != product_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftly_catalog::{CategoryDraft, PriceTier, PricedProduct, ProductDraft, SubCategoryDraft};
    use rust_decimal_macros::dec;

    fn product(sku: &str, name: &str, category: &str) -> Product {
        Product::from_draft(ProductDraft {
            sku: sku.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            subcategory: String::new(),
            images: vec![],
            is_active: true,
            currency: None,
            pricing: PricedProduct::new(dec!(12.00), vec![PriceTier::new(10, 49, dec!(9.00))], 100),
        })
    }

    #[tokio::test]
    async fn test_product_crud() {
        let repo = InMemoryProductRepository::new();
        let mut mug = product("MUG-1", "Mug", "Drinkware");
        repo.create_product(&mug).await.unwrap();

        mug.name = "Enamel Mug".to_string();
        repo.update_product(&mug).await.unwrap();
        assert_eq!(repo.get_product(mug.id).await.unwrap().unwrap().name, "Enamel Mug");

        assert!(repo.delete_product(mug.id).await.unwrap());
        assert!(!repo.delete_product(mug.id).await.unwrap());
        assert!(matches!(
            repo.update_product(&mug).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let repo = InMemoryProductRepository::new();
        repo.create_product(&product("PEN-1", "Pen", "Stationery")).await.unwrap();

        assert!(matches!(
            repo.create_product(&product("PEN-1", "Other Pen", "Stationery")).await,
            Err(CoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_to_taken_sku_rejected() {
        let repo = InMemoryProductRepository::new();
        repo.create_product(&product("PEN-1", "Pen", "Stationery")).await.unwrap();
        let mut other = product("PEN-2", "Other Pen", "Stationery");
        repo.create_product(&other).await.unwrap();

        // Saving a product under its own SKU is fine
        repo.update_product(&other).await.unwrap();

        other.sku = "PEN-1".to_string();
        assert!(matches!(
            repo.update_product(&other).await,
            Err(CoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts_by_name() {
        let repo = InMemoryProductRepository::new();
        repo.create_product(&product("B-1", "Tumbler", "Drinkware")).await.unwrap();
        repo.create_product(&product("A-1", "Bottle", "Drinkware")).await.unwrap();
        repo.create_product(&product("N-1", "Notebook", "Stationery")).await.unwrap();

        let filter = ProductFilter {
            category: Some("drinkware".to_string()),
            ..Default::default()
        };
        let names: Vec<String> = repo
            .list_products(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Bottle", "Tumbler"]);
    }

    #[tokio::test]
    async fn test_cart_save_and_delete() {
        let repo = InMemoryCartRepository::new();
        let cart = Cart::new("acme", "MYR");
        repo.save_cart(&cart).await.unwrap();
        assert_eq!(repo.get_cart("acme").await.unwrap().unwrap().id, cart.id);

        repo.delete_cart("acme").await.unwrap();
        assert!(repo.get_cart("acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_proposals_listed_newest_first() {
        let repo = InMemoryProposalRepository::new();
        let mut older = Proposal::new(
            "acme".to_string(),
            "Q1".to_string(),
            "Globex".to_string(),
            "buyer@globex.test".to_string(),
            "MYR".to_string(),
            30,
        );
        older.created_at -= chrono::Duration::days(1);
        let newer = Proposal::new(
            "acme".to_string(),
            "Q2".to_string(),
            "Globex".to_string(),
            "buyer@globex.test".to_string(),
            "MYR".to_string(),
            30,
        );
        repo.save_proposal(&older).await.unwrap();
        repo.save_proposal(&newer).await.unwrap();

        let listed = repo.list_proposals("acme").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert!(repo.list_proposals("initech").await.unwrap().is_empty());
    }

    fn category(name: &str) -> Category {
        Category::from_draft(CategoryDraft { name: name.to_string() }).unwrap()
    }

    fn subcategory(category: &str, name: &str) -> SubCategory {
        SubCategory::from_draft(SubCategoryDraft {
            category: category.to_string(),
            name: name.to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_category_names_unique_ignoring_case() {
        let repo = InMemoryCategoryRepository::new();
        repo.create_category(&category("Drinkware")).await.unwrap();

        assert!(matches!(
            repo.create_category(&category("drinkware")).await,
            Err(CoreError::Conflict(_))
        ));
        assert!(repo.find_category("DRINKWARE").await.unwrap().is_some());

        repo.create_category(&category("Bags")).await.unwrap();
        let names: Vec<String> = repo
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Bags", "Drinkware"]);
    }

    #[tokio::test]
    async fn test_subcategory_unique_within_category() {
        let repo = InMemoryCategoryRepository::new();
        repo.create_subcategory(&subcategory("Drinkware", "Bottles")).await.unwrap();
        // Same name under another category is a different subcategory
        repo.create_subcategory(&subcategory("Bags", "Bottles")).await.unwrap();

        assert!(matches!(
            repo.create_subcategory(&subcategory("drinkware", "BOTTLES")).await,
            Err(CoreError::Conflict(_))
        ));

        assert_eq!(repo.list_subcategories(Some("Drinkware")).await.unwrap().len(), 1);
        assert_eq!(repo.list_subcategories(None).await.unwrap().len(), 2);
        assert!(repo.find_subcategory("Bags", "bottles").await.unwrap().is_some());
        assert!(repo.find_subcategory("Stationery", "Bottles").await.unwrap().is_none());

        let id = repo.list_subcategories(Some("Bags")).await.unwrap()[0].id;
        assert!(repo.delete_subcategory(id).await.unwrap());
        assert!(!repo.delete_subcategory(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_like_toggle_and_count() {
        let repo = InMemoryFavoriteRepository::new();
        let product_id = Uuid::new_v4();

        assert!(repo.toggle_like("c-1", product_id).await.unwrap());
        assert!(repo.toggle_like("c-2", product_id).await.unwrap());
        assert!(repo.is_liked("c-1", product_id).await.unwrap());
        assert_eq!(repo.like_count(product_id).await.unwrap(), 2);

        assert!(!repo.toggle_like("c-1", product_id).await.unwrap());
        assert!(!repo.is_liked("c-1", product_id).await.unwrap());
        assert_eq!(repo.like_count(product_id).await.unwrap(), 1);

        repo.forget_product(product_id).await.unwrap();
        assert_eq!(repo.like_count(product_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_liked_pages_newest_first() {
        let repo = InMemoryFavoriteRepository::new();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            repo.toggle_like("c-1", *id).await.unwrap();
        }
        repo.toggle_like("c-2", ids[0]).await.unwrap();

        let (page, total) = repo.list_liked("c-1", 0, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page, vec![ids[4], ids[3]]);

        let (page, _) = repo.list_liked("c-1", 4, 2).await.unwrap();
        assert_eq!(page, vec![ids[0]]);
    }
}
