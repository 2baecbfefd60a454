//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! middleware + stores produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters via the `metrics` facade)
//! ```
//!
//! # Design Decisions
//! - Trace ids appear as a structured field on every middleware event
//! - Metrics are no-ops until the embedding application installs a recorder

pub mod logging;
pub mod metrics;
