//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected and returned together rather than stopping at the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{AppConfig, TracerConfig};
use crate::store::StorageBackend;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate the whole application configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = match validate_tracer(&config.tracer) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {:?}", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the middleware section on its own.
pub fn validate_tracer(config: &TracerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.store_timeout_ms == Some(0) {
        errors.push(ValidationError::new(
            "tracer.store_timeout_ms",
            "must be greater than 0 (omit it to disable the deadline)",
        ));
    }

    match config.storage {
        StorageBackend::Memory => {
            if config.memory.max_entries == Some(0) {
                errors.push(ValidationError::new(
                    "tracer.memory.max_entries",
                    "must be greater than 0",
                ));
            }
            if config.memory.ttl_secs == Some(0) {
                errors.push(ValidationError::new(
                    "tracer.memory.ttl_secs",
                    "must be greater than 0",
                ));
            }
        }
        StorageBackend::Redis => match url::Url::parse(&config.redis.url) {
            Ok(url) if matches!(url.scheme(), "redis" | "rediss" | "redis+unix" | "unix") => {}
            Ok(url) => errors.push(ValidationError::new(
                "tracer.redis.url",
                format!("unsupported scheme {:?}", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(
                "tracer.redis.url",
                format!("{:?} is not a valid url: {}", config.redis.url, e),
            )),
        },
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
