//! Trace capture.
//!
//! # Responsibilities
//! - Generate a fresh identifier per captured request
//! - Assemble the timing record for one request/response exchange
//! - Serialize it to the opaque JSON payload handed to the store

pub mod id;
pub mod record;

pub use id::TraceId;
pub use record::{RequestTrace, TraceTimer};
