use async_trait::async_trait;
use giftly_core::repository::CartRepository;
use giftly_core::{Cart, CoreResult};
use redis::{AsyncCommands, RedisResult};
use tracing::debug;

use crate::storage_error;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn set_json_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await
    }

    pub async fn get_json(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(key).await
    }

    pub async fn del_key(&self, key: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del(key).await
    }

    /// Fixed-window counter; `true` while the caller is within `limit`
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        // Only the request that opens the window sets its expiry
        let script = redis::Script::new(RATE_LIMIT_SCRIPT);
        let count: i64 = script
            .key(key)
            .arg(window_seconds)
            .invoke_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

const RATE_LIMIT_SCRIPT: &str = r#"
    local count = redis.call("INCR", KEYS[1])
    if count == 1 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
    end
    return count
"#;

pub fn cart_key(customer_id: &str) -> String {
    format!("cart:{}", customer_id)
}

/// Carts kept as JSON documents that expire after a period of inactivity
pub struct RedisCartRepository {
    redis: RedisClient,
    ttl_seconds: u64,
}

impl RedisCartRepository {
    pub fn new(redis: RedisClient, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }
}

#[async_trait]
impl CartRepository for RedisCartRepository {
    async fn get_cart(&self, customer_id: &str) -> CoreResult<Option<Cart>> {
        let raw = self
            .redis
            .get_json(&cart_key(customer_id))
            .await
            .map_err(storage_error)?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json).map_err(storage_error)?)),
            None => Ok(None),
        }
    }

    async fn save_cart(&self, cart: &Cart) -> CoreResult<()> {
        let json = serde_json::to_string(cart).map_err(storage_error)?;
        self.redis
            .set_json_ex(&cart_key(&cart.customer_id), &json, self.ttl_seconds)
            .await
            .map_err(storage_error)?;
        debug!("Cart {} saved for {} (ttl {}s)", cart.id, cart.customer_id, self.ttl_seconds);
        Ok(())
    }

    async fn delete_cart(&self, customer_id: &str) -> CoreResult<()> {
        self.redis
            .del_key(&cart_key(customer_id))
            .await
            .map_err(storage_error)
    }
}
