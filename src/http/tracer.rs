//! The middleware core shared by every request.
//!
//! `SpeedTracer` owns the trace store for its whole lifetime. Requests
//! reach the store only through [`SpeedTracer::lookup`] and
//! [`SpeedTracer::capture`], which apply the optional store deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Response;
use bytes::Bytes;

use crate::config::{ConfigError, TracerConfig};
use crate::config::validation::validate_tracer;
use crate::error::TracerError;
use crate::http::middleware::SpeedTracerLayer;
use crate::http::request::TraceLookup;
use crate::http::response;
use crate::observability::metrics;
use crate::store::{self, StoreError, TraceStore};
use crate::trace::{RequestTrace, TraceId};

/// Trace capture and retrieval state.
pub struct SpeedTracer {
    store: Arc<dyn TraceStore>,
    store_timeout: Option<Duration>,
}

impl std::fmt::Debug for SpeedTracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeedTracer")
            .field("store", &self.store.name())
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl SpeedTracer {
    pub fn builder() -> SpeedTracerBuilder {
        SpeedTracerBuilder::default()
    }

    /// Build a tracer from `config` with the store it selects.
    pub fn new(config: TracerConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    /// The store this tracer reads and writes.
    pub fn store(&self) -> &Arc<dyn TraceStore> {
        &self.store
    }

    /// Wrap this tracer in a tower layer.
    pub fn into_layer(self) -> SpeedTracerLayer {
        SpeedTracerLayer::new(self)
    }

    /// Answer a retrieval request from the store.
    pub async fn lookup(&self, lookup: &TraceLookup) -> Result<Response<Body>, TracerError> {
        let payload = match lookup.id() {
            Some(id) => self.fetch(id).await?,
            None => None,
        };

        metrics::record_lookup(payload.is_some());
        tracing::debug!(
            trace_id = lookup.id().unwrap_or_default(),
            found = payload.is_some(),
            head = lookup.is_head(),
            "Serving trace lookup"
        );

        Ok(match payload {
            Some(payload) => response::trace_found(payload, lookup.is_head()),
            None => response::trace_not_found(),
        })
    }

    /// Persist the trace for a completed request.
    pub async fn capture(&self, id: &TraceId, trace: &RequestTrace) -> Result<(), TracerError> {
        let payload = trace.to_payload()?;
        let size = payload.len();

        self.persist(id.as_str(), payload).await?;

        metrics::record_capture();
        tracing::debug!(trace_id = %id, bytes = size, "Trace stored");
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Option<Bytes>, StoreError> {
        let result = self.with_deadline(self.store.get(id)).await;
        if let Err(e) = &result {
            metrics::record_store_error("get");
            tracing::error!(trace_id = %id, backend = self.store.name(), error = %e, "Trace lookup failed");
        }
        result
    }

    async fn persist(&self, id: &str, payload: Bytes) -> Result<(), StoreError> {
        let result = self.with_deadline(self.store.set(id, payload)).await;
        if let Err(e) = &result {
            metrics::record_store_error("set");
            tracing::error!(trace_id = %id, backend = self.store.name(), error = %e, "Trace store failed");
        }
        result
    }

    async fn with_deadline<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.store_timeout {
            Some(limit) => tokio::time::timeout(limit, op)
                .await
                .unwrap_or(Err(StoreError::Timeout(limit))),
            None => op.await,
        }
    }
}

/// Assembles a [`SpeedTracer`].
///
/// The store is resolved from the configuration unless one is supplied
/// with [`SpeedTracerBuilder::store`], which is how tests inject a
/// pre-seeded store or an application shares one between tracers.
#[derive(Default)]
pub struct SpeedTracerBuilder {
    config: TracerConfig,
    store: Option<Arc<dyn TraceStore>>,
}

impl SpeedTracerBuilder {
    pub fn config(mut self, config: TracerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `store` instead of constructing the configured backend.
    pub fn store(mut self, store: Arc<dyn TraceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Validate the configuration and construct the store.
    ///
    /// Fails here, before any request is served, if the backend cannot be
    /// built from the configuration.
    pub fn build(self) -> Result<SpeedTracer, ConfigError> {
        validate_tracer(&self.config).map_err(ConfigError::Validation)?;

        let store = match self.store {
            Some(store) => store,
            None => store::from_config(&self.config)?,
        };

        tracing::info!(
            backend = store.name(),
            store_timeout_ms = ?self.config.store_timeout_ms,
            "SpeedTracer initialized"
        );

        Ok(SpeedTracer {
            store,
            store_timeout: self.config.store_timeout(),
        })
    }
}
