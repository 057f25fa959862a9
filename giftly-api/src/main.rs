use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use giftly_api::{app, AppState};
use giftly_core::repository::{
    CartRepository, CategoryRepository, FavoriteRepository, ProductRepository, ProposalRepository,
};
use giftly_order::{CartService, FavoriteService, ProposalService, ProposalSettings};
use giftly_store::app_config::{Config, StorageBackend};
use giftly_store::memory::{
    InMemoryCartRepository, InMemoryCategoryRepository, InMemoryFavoriteRepository,
    InMemoryProductRepository, InMemoryProposalRepository,
};
use giftly_store::{
    DbClient, InMemoryRateLimiter, RateLimiter, RedisCartRepository, RedisClient, StoreCategoryRepository,
    StoreFavoriteRepository, StoreProductRepository, StoreProposalRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "giftly_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        "Starting Giftly API on port {} ({:?} storage)",
        config.server.port,
        config.storage.backend
    );

    let (products, categories, favorites, proposals): (
        Arc<dyn ProductRepository>,
        Arc<dyn CategoryRepository>,
        Arc<dyn FavoriteRepository>,
        Arc<dyn ProposalRepository>,
    ) = match config.storage.backend {
        StorageBackend::Memory => (
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryCategoryRepository::new()),
            Arc::new(InMemoryFavoriteRepository::new()),
            Arc::new(InMemoryProposalRepository::new()),
        ),
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("storage.backend = \"postgres\" requires a [database] section")?;
            let db = DbClient::new(database)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            (
                Arc::new(StoreProductRepository::new(db.pool.clone())),
                Arc::new(StoreCategoryRepository::new(db.pool.clone())),
                Arc::new(StoreFavoriteRepository::new(db.pool.clone())),
                Arc::new(StoreProposalRepository::new(db.pool.clone())),
            )
        }
    };

    // Redis Connection
    let redis = match &config.redis {
        Some(redis) => Some(Arc::new(
            RedisClient::new(&redis.url)
                .await
                .context("Failed to connect to Redis")?,
        )),
        None => None,
    };

    let carts: Arc<dyn CartRepository> = match &redis {
        Some(client) => Arc::new(RedisCartRepository::new(
            client.as_ref().clone(),
            config.cart.ttl_seconds,
        )),
        None => Arc::new(InMemoryCartRepository::new()),
    };

    // Shared across instances through Redis, per process otherwise
    let rate_limiter: Option<Arc<dyn RateLimiter>> = match (&redis, config.rate_limit.enabled) {
        (_, false) => None,
        (Some(client), true) => Some(client.clone() as Arc<dyn RateLimiter>),
        (None, true) => Some(Arc::new(InMemoryRateLimiter::new()) as Arc<dyn RateLimiter>),
    };

    let cart_service = Arc::new(CartService::new(
        products.clone(),
        carts.clone(),
        config.pricing.currency.clone(),
    ));
    let proposal_service = Arc::new(ProposalService::new(
        products.clone(),
        carts,
        proposals,
        ProposalSettings {
            currency: config.pricing.currency.clone(),
            validity_days: config.proposals.validity_days,
        },
    ));

    let favorite_service = Arc::new(FavoriteService::new(products.clone(), favorites));

    // SSE Broadcast Channel
    let (events, _) = tokio::sync::broadcast::channel(100);

    let app_state = AppState {
        products,
        categories,
        carts: cart_service,
        proposals: proposal_service,
        favorites: favorite_service,
        rate_limiter,
        events,
        pricing: config.pricing.clone(),
        rate_limit: config.rate_limit.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
