//! Fixed-window request counters.
//!
//! A window opens on the first request for a key and closes `window_seconds`
//! later no matter how many requests arrive in between.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use giftly_core::CoreResult;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::redis_repo::RedisClient;
use crate::storage_error;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request for `key`; `true` while the window is within `limit`
    async fn check(&self, key: &str, limit: i64, window_seconds: i64) -> CoreResult<bool>;
}

#[async_trait]
impl RateLimiter for RedisClient {
    async fn check(&self, key: &str, limit: i64, window_seconds: i64) -> CoreResult<bool> {
        self.check_rate_limit(key, limit, window_seconds)
            .await
            .map_err(storage_error)
    }
}

/// Single-process limiter used when Redis is not configured
#[derive(Default)]
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

struct Window {
    count: i64,
    opened_at: Instant,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str, limit: i64, window_seconds: i64) -> CoreResult<bool> {
        let length = Duration::from_secs(window_seconds.max(1).unsigned_abs());
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        windows.retain(|_, window| now.duration_since(window.opened_at) < length);

        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            opened_at: now,
        });
        window.count += 1;
        Ok(window.count <= limit)
    }
}
