//! Trace storage subsystem.
//!
//! # Data Flow
//! ```text
//! TracerConfig.storage (memory | redis)
//!     → from_config (validate, construct once)
//!     → Arc<dyn TraceStore> owned by SpeedTracer
//!     → shared by every in-flight request
//! ```
//!
//! # Design Decisions
//! - Backends are chosen by a typed selector, never looked up by name at request time
//! - An unknown id is `Ok(None)`, never an error
//! - Backend failures surface as `StoreError`; there is no fallback backend

pub mod memory;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, TracerConfig};

pub use self::memory::MemoryStore;
pub use self::remote::RedisStore;

/// Errors raised by a trace store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not complete the operation.
    #[error("trace store unavailable: {0}")]
    Unavailable(String),

    /// The operation did not complete within the configured deadline.
    #[error("trace store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Key-value storage for serialized trace payloads.
///
/// Implementations must be safe to share between concurrently handled
/// requests. The last writer for a given id wins.
#[async_trait]
pub trait TraceStore: Send + Sync {
    /// Fetch the payload stored under `id`, or `None` if there is none.
    async fn get(&self, id: &str) -> Result<Option<Bytes>, StoreError>;

    /// Store `payload` under `id`, replacing any previous value.
    async fn set(&self, id: &str, payload: Bytes) -> Result<(), StoreError>;

    /// Short backend name, used in logs and for inspection.
    fn name(&self) -> &'static str;
}

/// Storage backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process map (default).
    #[default]
    Memory,
    /// Networked Redis server.
    Redis,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Redis => write!(f, "redis"),
        }
    }
}

/// Construct the store selected by `config.storage`.
pub fn from_config(config: &TracerConfig) -> Result<Arc<dyn TraceStore>, ConfigError> {
    let store: Arc<dyn TraceStore> = match config.storage {
        StorageBackend::Memory => Arc::new(MemoryStore::from_config(&config.memory)?),
        StorageBackend::Redis => Arc::new(RedisStore::from_config(&config.redis)?),
    };

    tracing::debug!(backend = store.name(), "Trace store constructed");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_is_memory() {
        let store = from_config(&TracerConfig::default()).unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_explicit_redis_backend() {
        let mut config = TracerConfig::default();
        config.storage = StorageBackend::Redis;

        let store = from_config(&config).unwrap();
        assert_eq!(store.name(), "redis");
    }

    #[test]
    fn test_invalid_redis_url_fails_fast() {
        let mut config = TracerConfig::default();
        config.storage = StorageBackend::Redis;
        config.redis.url = "not a url".to_string();

        assert!(from_config(&config).is_err());
    }

    #[test]
    fn test_backend_selector_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            storage: StorageBackend,
        }

        let parsed: Wrapper = toml::from_str(r#"storage = "redis""#).unwrap();
        assert_eq!(parsed.storage, StorageBackend::Redis);
        assert!(toml::from_str::<Wrapper>(r#"storage = "mongo""#).is_err());
    }
}
