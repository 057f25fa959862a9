use rust_decimal::Decimal;
use uuid::Uuid;

/// Events published by the storefront for live subscribers
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreEvent {
    ProductPricingUpdated(ProductPricingUpdatedEvent),
    ProductRemoved(ProductRemovedEvent),
    CartUpdated(CartUpdatedEvent),
    ProposalCreated(ProposalCreatedEvent),
    ProposalStatusChanged(ProposalStatusChangedEvent),
}

impl StoreEvent {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::ProductPricingUpdated(_) => "product_pricing_updated",
            StoreEvent::ProductRemoved(_) => "product_removed",
            StoreEvent::CartUpdated(_) => "cart_updated",
            StoreEvent::ProposalCreated(_) => "proposal_created",
            StoreEvent::ProposalStatusChanged(_) => "proposal_status_changed",
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ProductPricingUpdatedEvent {
    pub product_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_price: Decimal,
    pub tier_count: usize,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ProductRemovedEvent {
    pub product_id: Uuid,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct CartUpdatedEvent {
    pub cart_id: Uuid,
    pub customer_id: String,
    pub total_items: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ProposalCreatedEvent {
    pub proposal_id: Uuid,
    pub customer_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ProposalStatusChangedEvent {
    pub proposal_id: Uuid,
    pub status: String,
    pub timestamp: i64,
}
