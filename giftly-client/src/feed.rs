use std::sync::Arc;
use std::time::Duration;

use giftly_catalog::PricedProduct;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

use crate::error::ClientError;
use crate::quote::{ClientQuote, QuoteState};
use crate::source::PriceSource;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Live quote for one product.
///
/// Quantity changes are priced locally straight away; the server is asked
/// once the quantity has been stable for the debounce window.
pub struct PriceFeed {
    quantities: mpsc::Sender<i64>,
    quotes: watch::Receiver<ClientQuote>,
    task: JoinHandle<()>,
}

impl PriceFeed {
    pub fn spawn(
        product_id: Uuid,
        pricing: PricedProduct,
        source: Arc<dyn PriceSource>,
        debounce: Duration,
    ) -> Self {
        let state = QuoteState::new(pricing);
        let (quote_tx, quotes) = watch::channel(state.current());
        let (quantities, quantity_rx) = mpsc::channel(32);

        let task = tokio::spawn(run(product_id, state, source, debounce, quantity_rx, quote_tx));

        Self {
            quantities,
            quotes,
            task,
        }
    }

    pub async fn set_quantity(&self, quantity: i64) -> Result<(), ClientError> {
        self.quantities
            .send(quantity)
            .await
            .map_err(|_| ClientError::Closed)
    }

    pub fn current(&self) -> ClientQuote {
        *self.quotes.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientQuote> {
        self.quotes.clone()
    }
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    product_id: Uuid,
    mut state: QuoteState,
    source: Arc<dyn PriceSource>,
    debounce: Duration,
    mut quantity_rx: mpsc::Receiver<i64>,
    quote_tx: watch::Sender<ClientQuote>,
) {
    let (answer_tx, mut answer_rx) = mpsc::unbounded_channel::<(u64, Result<Decimal, ClientError>)>();
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            next = quantity_rx.recv() => match next {
                Some(quantity) => {
                    let (_, quote) = state.request(quantity);
                    quote_tx.send_replace(quote);
                    deadline = Some(Instant::now() + debounce);
                }
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                let token = state.latest_token();
                let quantity = state.current().quantity;
                let source = source.clone();
                let answer_tx = answer_tx.clone();
                tokio::spawn(async move {
                    let result = source.fetch_price(product_id, quantity).await;
                    // The feed may have shut down meanwhile
                    let _ = answer_tx.send((token, result));
                });
            }
            Some((token, result)) = answer_rx.recv() => {
                if let Some(quote) = state.apply_authoritative(token, result) {
                    quote_tx.send_replace(quote);
                }
            }
        }
    }

    tracing::debug!("Price feed for {} stopped", product_id);
}
