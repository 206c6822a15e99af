//! Redis cache implementation.
//!
//! Provides a string-keyed cache with TTLs and a fixed-window rate limiter.
//! Both concerns are exposed through traits so callers can be tested
//! without a Redis server.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};

use super::health::HealthCheck;
use crate::config::{Config, CACHE_PREFIX_RATE_LIMIT};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Raw key-value cache operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> AppResult<Option<String>>;

    async fn set_raw(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Fixed-window request counter.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request against `identifier`.
    /// Returns (current_count, is_allowed).
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)>;
}

/// Read a JSON value from any cache store.
pub async fn get_json<T: DeserializeOwned>(
    cache: &dyn CacheStore,
    key: &str,
) -> AppResult<Option<T>> {
    match cache.get_raw(key).await? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| AppError::internal(format!("Cache deserialization error: {}", e))),
        None => Ok(None),
    }
}

/// Write a JSON value to any cache store.
pub async fn set_json<T: Serialize + Sync>(
    cache: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl_seconds: u64,
) -> AppResult<()> {
    let json = serde_json::to_string(value)
        .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;
    cache.set_raw(key, json, ttl_seconds).await
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }

    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(key).await.map_err(cache_error)?;
        Ok(exists)
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }
}

#[async_trait]
impl RateLimiter for Cache {
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: i64 = conn.incr(&key, 1).await.map_err(cache_error)?;
        if count == 1 {
            // First request opens the window
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }

        let count = count.max(0) as u64;
        Ok((count, count <= max_requests))
    }
}

#[async_trait]
impl HealthCheck for Cache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self) -> AppResult<()> {
        self.exists("health:ping").await.map(|_| ())
    }
}

fn cache_error(e: RedisError) -> AppError {
    AppError::internal(format!("Cache error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_json_decodes_cached_value() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_get_raw()
            .withf(|key| key == "product:cap")
            .returning(|_| Ok(Some("[1,2,3]".to_string())));

        let value: Option<Vec<u8>> = get_json(&cache, "product:cap").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_get_json_rejects_garbage() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_get_raw()
            .returning(|_| Ok(Some("not json".to_string())));

        let result: AppResult<Option<Vec<u8>>> = get_json(&cache, "k").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_set_json_passes_ttl() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_set_raw()
            .withf(|key, value, ttl| key == "k" && value == "{\"a\":1}" && *ttl == 30)
            .times(1)
            .returning(|_, _, _| Ok(()));

        set_json(&cache, "k", &serde_json::json!({"a": 1}), 30)
            .await
            .unwrap();
    }
}
