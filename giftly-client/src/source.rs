use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::ClientError;

/// Where authoritative unit prices come from
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self, product_id: Uuid, quantity: i64) -> Result<Decimal, ClientError>;
}

#[derive(Debug, Deserialize)]
struct PriceBody {
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
}

/// Reads `GET /v1/products/{id}/price?quantity=N` from a storefront API
pub struct HttpPriceSource {
    client: Client,
    base_url: String,
}

impl HttpPriceSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn price_url(&self, product_id: Uuid) -> String {
        format!("{}/v1/products/{}/price", self.base_url, product_id)
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_price(&self, product_id: Uuid, quantity: i64) -> Result<Decimal, ClientError> {
        debug!("Fetching price for {} at quantity {}", product_id, quantity);

        let response = self
            .client
            .get(self.price_url(product_id))
            .query(&[("quantity", quantity)])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<PriceBody>().await?.price),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(product_id)),
            other => Err(ClientError::Status(other.as_u16())),
        }
    }
}
