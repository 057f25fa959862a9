use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inventory::{clamp_quantity, InventoryError};
use crate::pricing::{PricedProduct, Quote};

pub const DEFAULT_CURRENCY: &str = "MYR";

/// Catalog product as stored and served
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_active: bool,
    pub currency: String,
    #[serde(flatten)]
    pub pricing: PricedProduct,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin-authored product fields, used for both create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub currency: Option<String>,
    #[serde(flatten)]
    pub pricing: PricedProduct,
}

fn default_active() -> bool {
    true
}

impl Product {
    pub fn from_draft(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sku: draft.sku,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            subcategory: draft.subcategory,
            images: draft.images,
            is_active: draft.is_active,
            currency: draft.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            pricing: draft.pricing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the authored fields, keeping identity and creation time
    pub fn apply_draft(&mut self, draft: ProductDraft) {
        self.sku = draft.sku;
        self.name = draft.name;
        self.description = draft.description;
        self.category = draft.category;
        self.subcategory = draft.subcategory;
        self.images = draft.images;
        self.is_active = draft.is_active;
        if let Some(currency) = draft.currency {
            self.currency = currency;
        }
        self.pricing = draft.pricing;
        self.updated_at = Utc::now();
    }

    /// Quote an order line after clamping the quantity to stock
    pub fn quote_for_order(&self, requested: i64) -> Result<Quote, InventoryError> {
        let quantity = clamp_quantity(requested, self.pricing.quantity_available)?;
        Ok(self.pricing.quote(i64::from(quantity)))
    }

    /// Case-insensitive match on name, description and SKU
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self.sku.to_lowercase().contains(&term)
    }
}

/// Browse filter for the storefront catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_inactive && !product.is_active {
            return false;
        }
        if let Some(category) = &self.category {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(subcategory) = &self.subcategory {
            if !product.subcategory.eq_ignore_ascii_case(subcategory) {
                return false;
            }
        }
        self.search
            .as_deref()
            .map_or(true, |term| product.matches_search(term))
    }
}
