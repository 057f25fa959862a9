use giftly_catalog::inventory::clamp_to_minimum;
use giftly_catalog::{line_total, PriceTier, PricedProduct};
use rust_decimal::Decimal;

use crate::error::ClientError;

/// How much to trust the displayed price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSource {
    /// Computed locally, server answer pending
    Optimistic,
    /// Confirmed by the server
    Authoritative,
    /// Server unreachable; local computation stands
    LocalFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientQuote {
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub matched_tier: Option<PriceTier>,
    pub source: QuoteSource,
}

/// Reconciles optimistic and authoritative prices for one product.
///
/// Every `request` issues a new token; only the answer carrying the latest
/// token is applied, so a slow response can never overwrite a newer quantity.
#[derive(Debug, Clone)]
pub struct QuoteState {
    pricing: PricedProduct,
    latest_token: u64,
    current: ClientQuote,
}

impl QuoteState {
    pub fn new(pricing: PricedProduct) -> Self {
        let current = local_quote(&pricing, 1, QuoteSource::Optimistic);
        Self {
            pricing,
            latest_token: 0,
            current,
        }
    }

    pub fn current(&self) -> ClientQuote {
        self.current
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token
    }

    /// New quantity: show the local quote at once and return the token the
    /// server answer must carry.
    pub fn request(&mut self, quantity: i64) -> (u64, ClientQuote) {
        self.latest_token += 1;
        let quantity = clamp_to_minimum(quantity);
        self.current = local_quote(&self.pricing, quantity, QuoteSource::Optimistic);
        (self.latest_token, self.current)
    }

    /// Apply a server answer. Returns the new quote, or `None` when the answer
    /// is stale and was dropped.
    pub fn apply_authoritative(
        &mut self,
        token: u64,
        result: Result<Decimal, ClientError>,
    ) -> Option<ClientQuote> {
        if token != self.latest_token {
            tracing::debug!("Dropping stale price response {} (latest {})", token, self.latest_token);
            return None;
        }

        match result {
            Ok(price) => {
                if price != self.current.unit_price {
                    tracing::info!(
                        "Server price {} replaces local {} at quantity {}",
                        price,
                        self.current.unit_price,
                        self.current.quantity
                    );
                }
                let matched_tier = self
                    .current
                    .matched_tier
                    .filter(|tier| tier.price == price);
                self.current = ClientQuote {
                    quantity: self.current.quantity,
                    unit_price: price,
                    total: line_total(price, self.current.quantity),
                    matched_tier,
                    source: QuoteSource::Authoritative,
                };
            }
            Err(e) => {
                tracing::warn!(
                    "Price check failed, keeping local quote at quantity {}: {}",
                    self.current.quantity,
                    e
                );
                self.current.source = QuoteSource::LocalFallback;
            }
        }
        Some(self.current)
    }
}

fn local_quote(pricing: &PricedProduct, quantity: i64, source: QuoteSource) -> ClientQuote {
    let quote = pricing.quote(quantity);
    ClientQuote {
        quantity: quote.quantity,
        unit_price: quote.unit_price,
        total: quote.total,
        matched_tier: quote.matched_tier,
        source,
    }
}
