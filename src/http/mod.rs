//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → request.rs (is this the /speedtracer route?)
//!         yes → tracer.rs lookup → response.rs (200 JSON | 404)
//!         no  → downstream service
//!               → tracer.rs capture (TraceId + RequestTrace → store)
//!               → X-TraceUrl added to the downstream response
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod tracer;

pub use middleware::{SpeedTracerLayer, SpeedTracerService, X_TRACE_URL};
pub use request::{trace_url, TraceLookup, TRACE_PATH};
pub use server::HttpServer;
pub use tracer::{SpeedTracer, SpeedTracerBuilder};
