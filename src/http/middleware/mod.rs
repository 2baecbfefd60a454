//! Tower middleware.

pub mod layer;

pub use layer::{SpeedTracerLayer, SpeedTracerService, X_TRACE_URL};
