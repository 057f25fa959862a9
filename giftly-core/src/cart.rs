use chrono::{DateTime, Utc};
use giftly_catalog::{PriceTier, Product, Quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shopper's cart. Line prices are snapshots taken when the line was priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: String,
    pub items: Vec<CartItem>,
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub total_items: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    pub images: Vec<String>,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub applied_tier: Option<PriceTier>,
    pub priced_at: DateTime<Utc>,
}

impl CartItem {
    pub fn from_quote(product: &Product, quote: &Quote) -> Self {
        let mut item = Self {
            id: Uuid::new_v4(),
            product_id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            subcategory: product.subcategory.clone(),
            images: product.images.clone(),
            quantity: 0,
            unit_price: Decimal::ZERO,
            total_price: Decimal::ZERO,
            applied_tier: None,
            priced_at: Utc::now(),
        };
        item.reprice(quote);
        item
    }

    /// Replace the price snapshot. Quantities come from the quote, which is
    /// already clamped to stock.
    pub fn reprice(&mut self, quote: &Quote) {
        self.quantity = u32::try_from(quote.quantity).unwrap_or(u32::MAX);
        self.unit_price = quote.unit_price;
        self.total_price = quote.total;
        self.applied_tier = quote.matched_tier;
        self.priced_at = Utc::now();
    }
}

impl Cart {
    pub fn new(customer_id: impl Into<String>, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id: customer_id.into(),
            items: Vec::new(),
            currency: currency.into(),
            total_amount: Decimal::ZERO,
            total_items: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_for_product_mut(&mut self, product_id: &Uuid) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| &item.product_id == product_id)
    }

    pub fn item_mut(&mut self, item_id: &Uuid) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| &item.id == item_id)
    }

    pub fn push_item(&mut self, item: CartItem) {
        self.items.push(item);
        self.recalculate();
    }

    /// Returns the removed line, if any
    pub fn remove_item(&mut self, item_id: &Uuid) -> Option<CartItem> {
        let position = self.items.iter().position(|item| &item.id == item_id)?;
        let removed = self.items.remove(position);
        self.recalculate();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recalculate();
    }

    /// Totals are sums of the already-rounded line totals
    pub fn recalculate(&mut self) {
        self.total_amount = self.items.iter().map(|item| item.total_price).sum();
        self.total_items = self.items.iter().map(|item| u64::from(item.quantity)).sum();
        self.updated_at = Utc::now();
    }
}
