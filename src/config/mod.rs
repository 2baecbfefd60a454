//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → TracerConfig handed to SpeedTracer::builder
//! ```
//!
//! # Design Decisions
//! - Config is resolved once; the tracer never re-reads it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AppConfig, ListenerConfig, MemoryStoreConfig, ObservabilityConfig, RedisStoreConfig, TracerConfig};
pub use validation::ValidationError;
