//! Redis-backed trace store.

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};
use tokio::sync::OnceCell;

use crate::config::{ConfigError, RedisStoreConfig};
use crate::store::{StoreError, TraceStore};

/// Trace store that delegates to a Redis server.
///
/// The URL is validated at construction; the multiplexed connection is
/// opened on first use and shared by all requests afterwards. Errors are
/// reported as [`StoreError::Unavailable`] and never retried here.
pub struct RedisStore {
    client: Client,
    conn: OnceCell<MultiplexedConnection>,
    key_prefix: String,
    ttl_secs: Option<u64>,
}

impl RedisStore {
    /// Create a store for the server at `url` (e.g. "redis://127.0.0.1:6379").
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        let client = Client::open(url)
            .map_err(|e| ConfigError::Store(format!("invalid redis url {:?}: {}", url, e)))?;

        Ok(Self {
            client,
            conn: OnceCell::new(),
            key_prefix: String::new(),
            ttl_secs: None,
        })
    }

    pub fn from_config(config: &RedisStoreConfig) -> Result<Self, ConfigError> {
        let mut store = Self::new(&config.url)?.with_prefix(config.key_prefix.clone());
        store.ttl_secs = config.ttl_secs.filter(|ttl| *ttl > 0);
        Ok(store)
    }

    /// Namespace keys as `<prefix>:<id>`. An empty prefix stores ids as-is.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn key(&self, id: &str) -> String {
        if self.key_prefix.is_empty() {
            id.to_string()
        } else {
            format!("{}:{}", self.key_prefix, id)
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                tracing::info!("Connecting to redis trace store");
                self.client.get_multiplexed_async_connection().await
            })
            .await
            .map_err(map_redis_error)?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl TraceStore for RedisStore {
    async fn get(&self, id: &str) -> Result<Option<Bytes>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn.get(self.key(id)).await.map_err(map_redis_error)?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, id: &str, payload: Bytes) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let key = self.key(id);
        match self.ttl_secs {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, payload.to_vec(), ttl)
                .await
                .map_err(map_redis_error)?,
            None => conn
                .set::<_, _, ()>(key, payload.to_vec())
                .await
                .map_err(map_redis_error)?,
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

fn map_redis_error(err: RedisError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}
