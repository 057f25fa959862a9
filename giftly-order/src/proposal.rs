use std::sync::Arc;

use giftly_catalog::inventory::clamp_quantity;
use giftly_catalog::pricing::CURRENCY_DP;
use giftly_catalog::{InventoryError, Product};
use giftly_core::repository::{CartRepository, ProductRepository, ProposalRepository};
use giftly_core::{CoreError, Proposal, ProposalItem, ProposalStatus};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{ProposalDetails, ProposalDraft};

#[derive(Debug, Clone)]
pub struct ProposalSettings {
    pub currency: String,
    pub validity_days: i64,
}

impl Default for ProposalSettings {
    fn default() -> Self {
        Self {
            currency: giftly_catalog::product::DEFAULT_CURRENCY.to_string(),
            validity_days: 30,
        }
    }
}

/// Creates and tracks quotations. Line prices are snapshotted at creation.
pub struct ProposalService {
    products: Arc<dyn ProductRepository>,
    carts: Arc<dyn CartRepository>,
    proposals: Arc<dyn ProposalRepository>,
    settings: ProposalSettings,
}

impl ProposalService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        carts: Arc<dyn CartRepository>,
        proposals: Arc<dyn ProposalRepository>,
        settings: ProposalSettings,
    ) -> Self {
        Self {
            products,
            carts,
            proposals,
            settings,
        }
    }

    /// Price each requested line (custom price if given, catalog tiers otherwise)
    pub async fn create(&self, customer_id: &str, draft: ProposalDraft) -> Result<Proposal, ProposalError> {
        if draft.items.is_empty() {
            return Err(ProposalError::Empty);
        }
        let mut proposal = self.start(customer_id, &draft.details)?;

        for line in &draft.items {
            let product = self.load_product(line.product_id).await?;
            let item = match line.custom_price {
                Some(price) => {
                    check_custom_price(line.product_id, price)?;
                    let quantity = clamp_quantity(line.quantity, product.pricing.quantity_available)?;
                    ProposalItem::with_custom_price(&product, quantity, price)
                }
                None => {
                    let quote = product.quote_for_order(line.quantity)?;
                    ProposalItem::from_quote(&product, &quote)
                }
            };
            proposal.add_item(item);
        }

        self.finish(proposal, &draft.details).await
    }

    /// Copy the customer's cart lines, keeping the prices they were added at
    pub async fn create_from_cart(
        &self,
        customer_id: &str,
        details: ProposalDetails,
        clear_cart: bool,
    ) -> Result<Proposal, ProposalError> {
        let cart = self
            .carts
            .get_cart(customer_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(ProposalError::Empty)?;

        let mut proposal = self.start(customer_id, &details)?;
        for item in &cart.items {
            proposal.add_item(ProposalItem::from_cart_item(item));
        }

        let proposal = self.finish(proposal, &details).await?;
        if clear_cart {
            self.carts.delete_cart(customer_id).await?;
        }
        Ok(proposal)
    }

    pub async fn get(&self, customer_id: &str, id: Uuid) -> Result<Proposal, ProposalError> {
        self.proposals
            .get_proposal(id)
            .await?
            .filter(|proposal| proposal.customer_id == customer_id)
            .ok_or(ProposalError::NotFound(id))
    }

    pub async fn list(&self, customer_id: &str) -> Result<Vec<Proposal>, ProposalError> {
        Ok(self.proposals.list_proposals(customer_id).await?)
    }

    pub async fn update_status(
        &self,
        customer_id: &str,
        id: Uuid,
        status: ProposalStatus,
    ) -> Result<Proposal, ProposalError> {
        let mut proposal = self.get(customer_id, id).await?;
        let from = proposal.status;

        if status == ProposalStatus::Accepted && proposal.is_expired() {
            return Err(ProposalError::Expired(id));
        }
        if !proposal.advance(status) {
            return Err(ProposalError::InvalidTransition {
                from: from.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }

        self.proposals.save_proposal(&proposal).await?;
        tracing::info!("Proposal {} moved {} -> {}", id, from.as_str(), status.as_str());
        Ok(proposal)
    }

    pub async fn delete(&self, customer_id: &str, id: Uuid) -> Result<(), ProposalError> {
        self.get(customer_id, id).await?;
        self.proposals.delete_proposal(id).await?;
        Ok(())
    }

    fn start(&self, customer_id: &str, details: &ProposalDetails) -> Result<Proposal, ProposalError> {
        if let Some(problem) = details.problem() {
            return Err(ProposalError::Invalid(problem.to_string()));
        }
        Ok(Proposal::new(
            customer_id.to_string(),
            details.name.trim().to_string(),
            details.client_name.trim().to_string(),
            details.client_email.trim().to_string(),
            self.settings.currency.clone(),
            self.settings.validity_days,
        ))
    }

    async fn finish(&self, mut proposal: Proposal, details: &ProposalDetails) -> Result<Proposal, ProposalError> {
        if details.send_now {
            proposal.advance(ProposalStatus::Sent);
        }
        self.proposals.save_proposal(&proposal).await?;
        tracing::info!(
            "Proposal {} created for {} ({} items, total {} {})",
            proposal.id,
            proposal.client_email,
            proposal.items.len(),
            proposal.total_amount,
            proposal.currency
        );
        Ok(proposal)
    }

    async fn load_product(&self, product_id: Uuid) -> Result<Product, ProposalError> {
        let product = self
            .products
            .get_product(product_id)
            .await?
            .ok_or(ProposalError::ProductNotFound(product_id))?;

        if !product.is_active {
            return Err(ProposalError::ProductUnavailable(product_id));
        }
        Ok(product)
    }
}

fn check_custom_price(product_id: Uuid, price: Decimal) -> Result<(), ProposalError> {
    if price <= Decimal::ZERO || price.normalize().scale() > CURRENCY_DP {
        return Err(ProposalError::InvalidCustomPrice(product_id));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ProposalError {
    #[error("Proposal not found: {0}")]
    NotFound(Uuid),

    #[error("A proposal needs at least one item")]
    Empty,

    #[error("Invalid proposal: {0}")]
    Invalid(String),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Product is not available: {0}")]
    ProductUnavailable(Uuid),

    #[error("Custom price for product {0} must be positive with at most two decimals")]
    InvalidCustomPrice(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Proposal {0} is past its validity date")]
    Expired(Uuid),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Storage(#[from] CoreError),
}
