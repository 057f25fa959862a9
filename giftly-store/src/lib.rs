pub mod app_config;
pub mod database;
pub mod catalog_repo;
pub mod proposal_repo;
pub mod taxonomy_repo;
pub mod favorite_repo;
pub mod redis_repo;
pub mod rate_limit;
pub mod memory;

pub use database::DbClient;
pub use redis_repo::{RedisCartRepository, RedisClient};
pub use rate_limit::{InMemoryRateLimiter, RateLimiter};
pub use catalog_repo::StoreProductRepository;
pub use proposal_repo::StoreProposalRepository;
pub use taxonomy_repo::StoreCategoryRepository;
pub use favorite_repo::StoreFavoriteRepository;

use giftly_core::CoreError;

pub(crate) fn storage_error(err: impl std::fmt::Display) -> CoreError {
    CoreError::StorageError(err.to_string())
}
