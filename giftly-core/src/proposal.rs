use chrono::{DateTime, Duration, Utc};
use giftly_catalog::{line_total, PriceTier, Product, Quote};
use giftly_shared::pii::Masked;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartItem;

/// Proposal lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Draft,
    Sent,
    Viewed,
    Accepted,
}

impl ProposalStatus {
    /// Draft → Sent → Viewed → Accepted, with Sent → Accepted allowed directly
    pub fn can_transition_to(self, next: ProposalStatus) -> bool {
        matches!(
            (self, next),
            (ProposalStatus::Draft, ProposalStatus::Sent)
                | (ProposalStatus::Sent, ProposalStatus::Viewed)
                | (ProposalStatus::Sent, ProposalStatus::Accepted)
                | (ProposalStatus::Viewed, ProposalStatus::Accepted)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Draft => "DRAFT",
            ProposalStatus::Sent => "SENT",
            ProposalStatus::Viewed => "VIEWED",
            ProposalStatus::Accepted => "ACCEPTED",
        }
    }
}

/// Where a proposal line's unit price came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceSource {
    Tier,
    Base,
    /// Manually negotiated by the proposal author
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalItem {
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub images: Vec<String>,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub price_source: PriceSource,
    pub applied_tier: Option<PriceTier>,
}

impl ProposalItem {
    /// Line priced from the catalog at proposal time
    pub fn from_quote(product: &Product, quote: &Quote) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            images: product.images.clone(),
            quantity: u32::try_from(quote.quantity).unwrap_or(u32::MAX),
            unit_price: quote.unit_price,
            total_price: quote.total,
            price_source: if quote.matched_tier.is_some() {
                PriceSource::Tier
            } else {
                PriceSource::Base
            },
            applied_tier: quote.matched_tier,
        }
    }

    /// Line with an author-supplied unit price
    pub fn with_custom_price(product: &Product, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            images: product.images.clone(),
            quantity,
            unit_price,
            total_price: line_total(unit_price, i64::from(quantity)),
            price_source: PriceSource::Custom,
            applied_tier: None,
        }
    }

    /// Copies the cart's snapshot as-is
    pub fn from_cart_item(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            description: item.description.clone(),
            images: item.images.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
            price_source: if item.applied_tier.is_some() {
                PriceSource::Tier
            } else {
                PriceSource::Base
            },
            applied_tier: item.applied_tier,
        }
    }
}

/// A priced quotation sent to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,
    pub customer_id: String,
    pub name: String,
    pub client_name: String,
    pub client_email: Masked<String>,
    pub status: ProposalStatus,
    pub items: Vec<ProposalItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub currency: String,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    pub fn new(
        customer_id: String,
        name: String,
        client_name: String,
        client_email: String,
        currency: String,
        validity_days: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            name,
            client_name,
            client_email: Masked::new(client_email),
            status: ProposalStatus::Draft,
            items: Vec::new(),
            total_amount: Decimal::ZERO,
            currency,
            valid_until: now + Duration::days(validity_days),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_item(&mut self, item: ProposalItem) {
        self.total_amount += item.total_price;
        self.items.push(item);
        self.updated_at = Utc::now();
    }

    /// Apply a status change if the lifecycle allows it. Returns whether it did.
    pub fn advance(&mut self, next: ProposalStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at = Utc::now();
        true
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.valid_until
    }
}
