//! SpeedTracer middleware.
//!
//! Captures a timing trace for every request passing through a tower
//! service, stores it under a fresh id, and advertises it with an
//! `X-TraceUrl: /speedtracer?id=<id>` response header. The same layer serves
//! `/speedtracer?id=<id>` from the store.
//!
//! ```no_run
//! use axum::{error_handling::HandleErrorLayer, http::StatusCode, routing::get, Router};
//! use speedtracer::{SpeedTracer, TracerConfig};
//! use tower::{BoxError, ServiceBuilder};
//!
//! # fn main() -> Result<(), speedtracer::config::ConfigError> {
//! let tracer = SpeedTracer::new(TracerConfig::default())?;
//! let app = Router::new().route("/", get(|| async { "Hello World" }));
//!
//! let traced = ServiceBuilder::new()
//!     .layer(HandleErrorLayer::new(|_: BoxError| async {
//!         StatusCode::INTERNAL_SERVER_ERROR
//!     }))
//!     .layer(tracer.into_layer())
//!     .service(app);
//! let router: Router = Router::new().fallback_service(traced);
//! # Ok(())
//! # }
//! ```

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod trace;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::{AppConfig, TracerConfig};
pub use error::TracerError;
pub use http::{HttpServer, SpeedTracer, SpeedTracerLayer, X_TRACE_URL};
pub use lifecycle::Shutdown;
pub use store::{MemoryStore, RedisStore, StorageBackend, StoreError, TraceStore};
