use std::sync::Arc;
use std::time::Duration;

use giftly_api::{app, AppState};
use giftly_catalog::{PriceTier, PricedProduct};
use giftly_client::{ClientError, HttpPriceSource, PriceFeed, PriceSource, QuoteSource};
use giftly_order::{CartService, FavoriteService, ProposalService, ProposalSettings};
use giftly_store::app_config::{PricingConfig, RateLimitConfig};
use giftly_store::memory::{
    InMemoryCartRepository, InMemoryCategoryRepository, InMemoryFavoriteRepository,
    InMemoryProductRepository, InMemoryProposalRepository,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

/// Serves the storefront API on an ephemeral port and returns its base URL
async fn spawn_server() -> String {
    let products = Arc::new(InMemoryProductRepository::new());
    let carts = Arc::new(InMemoryCartRepository::new());
    let (events, _) = tokio::sync::broadcast::channel(16);
    let state = AppState {
        products: products.clone(),
        categories: Arc::new(InMemoryCategoryRepository::new()),
        carts: Arc::new(CartService::new(products.clone(), carts.clone(), "MYR")),
        proposals: Arc::new(ProposalService::new(
            products.clone(),
            carts,
            Arc::new(InMemoryProposalRepository::new()),
            ProposalSettings::default(),
        )),
        favorites: Arc::new(FavoriteService::new(
            products,
            Arc::new(InMemoryFavoriteRepository::new()),
        )),
        rate_limiter: None,
        events,
        pricing: PricingConfig::default(),
        rate_limit: RateLimitConfig {
            enabled: false,
            requests_per_window: 100,
            window_seconds: 60,
        },
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn post(base_url: &str, path: &str, body: Value) -> Value {
    let response = local_client()
        .post(format!("{}{}", base_url, path))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED, "POST {}", path);
    response.json().await.unwrap()
}

async fn create_bottle(base_url: &str) -> Uuid {
    post(base_url, "/v1/admin/categories", json!({ "name": "Drinkware" })).await;
    let product = post(
        base_url,
        "/v1/admin/products",
        json!({
            "sku": "BOTTLE-01",
            "name": "Steel Bottle",
            "category": "Drinkware",
            "basePrice": 10.0,
            "quantityAvailable": 500,
            "priceTiers": [
                { "minQuantity": 1, "maxQuantity": 9, "price": 10.0 },
                { "minQuantity": 10, "maxQuantity": 49, "price": 8.5 },
                { "minQuantity": 50, "maxQuantity": 999, "price": 7.0 }
            ]
        }),
    )
    .await;
    product["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_fetches_price_from_server() {
    let base_url = spawn_server().await;
    let id = create_bottle(&base_url).await;
    let source = HttpPriceSource::with_client(local_client(), format!("{}/", base_url));

    assert_eq!(source.fetch_price(id, 10).await.unwrap(), dec!(8.50));
    assert_eq!(source.fetch_price(id, 60).await.unwrap(), dec!(7.00));
    // Server clamps non-positive quantities to one
    assert_eq!(source.fetch_price(id, 0).await.unwrap(), dec!(10.00));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let base_url = spawn_server().await;
    let source = HttpPriceSource::with_client(local_client(), base_url);
    let missing = Uuid::new_v4();

    match source.fetch_price(missing, 5).await {
        Err(ClientError::NotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_feed_confirms_quote_with_server() {
    let base_url = spawn_server().await;
    let id = create_bottle(&base_url).await;
    let pricing = PricedProduct::new(
        dec!(10.00),
        vec![
            PriceTier::new(1, 9, dec!(10.00)),
            PriceTier::new(10, 49, dec!(8.50)),
            PriceTier::new(50, 999, dec!(7.00)),
        ],
        500,
    );
    let feed = PriceFeed::spawn(
        id,
        pricing,
        Arc::new(HttpPriceSource::with_client(local_client(), base_url)),
        Duration::from_millis(20),
    );
    let mut updates = feed.subscribe();

    feed.set_quantity(60).await.unwrap();
    let quote = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            updates.changed().await.unwrap();
            let quote = *updates.borrow_and_update();
            if quote.source != QuoteSource::Optimistic {
                return quote;
            }
        }
    })
    .await
    .expect("no server answer within 5s");

    assert_eq!(quote.source, QuoteSource::Authoritative);
    assert_eq!(quote.unit_price, dec!(7.00));
    assert_eq!(quote.total, dec!(420.00));
}
