//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section has defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::store::StorageBackend;

/// Root configuration for the speedtracer server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Middleware and trace store settings.
    pub tracer: TracerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Middleware configuration, resolved once when the tracer is built.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TracerConfig {
    /// Which trace store backend to construct.
    pub storage: StorageBackend,

    /// Deadline for a single store get/set. Unset means no deadline.
    pub store_timeout_ms: Option<u64>,

    /// Parameters for the in-process backend.
    pub memory: MemoryStoreConfig,

    /// Parameters for the Redis backend.
    pub redis: RedisStoreConfig,
}

impl TracerConfig {
    pub fn store_timeout(&self) -> Option<Duration> {
        self.store_timeout_ms.map(Duration::from_millis)
    }
}

/// In-process store retention. Both limits are off by default.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MemoryStoreConfig {
    /// Maximum number of stored traces; oldest are evicted first.
    pub max_entries: Option<usize>,

    /// Seconds after which a stored trace reads as absent.
    pub ttl_secs: Option<u64>,
}

/// Redis store connection parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisStoreConfig {
    /// Connection URL (e.g., "redis://127.0.0.1:6379").
    pub url: String,

    /// Optional namespace prepended to every key as `<prefix>:<id>`.
    /// Empty (the default) stores each trace under its bare id.
    pub key_prefix: String,

    /// Server-side expiry in seconds (SETEX). Unset keeps keys forever.
    pub ttl_secs: Option<u64>,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: String::new(),
            ttl_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
