use std::sync::Arc;

use giftly_core::repository::{CategoryRepository, ProductRepository};
use giftly_order::{CartService, FavoriteService, ProposalService};
use giftly_shared::models::StoreEvent;
use giftly_store::app_config::{PricingConfig, RateLimitConfig};
use giftly_store::RateLimiter;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub carts: Arc<CartService>,
    pub proposals: Arc<ProposalService>,
    pub favorites: Arc<FavoriteService>,
    /// Absent when rate limiting is disabled
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    pub events: broadcast::Sender<StoreEvent>,
    pub pricing: PricingConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppState {
    /// Fire-and-forget; having no subscribers is not an error
    pub fn publish(&self, event: StoreEvent) {
        let name = event.name();
        if self.events.send(event).is_err() {
            tracing::trace!("No subscribers for {}", name);
        }
    }
}
