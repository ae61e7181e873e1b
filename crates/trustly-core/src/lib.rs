//! Shared plumbing for the Trustly client crates: tracing setup and API
//! endpoint configuration.

pub mod config;
pub mod tracing;

pub use config::{
    ApiConfig, ConfigError, ConfigResult, DEFAULT_API_PATH, DEFAULT_HOST, PRODUCTION_HOST,
};
pub use tracing::{
    TracingConfig, TracingError, TracingOutputFormat, TracingResult, init_tracing,
};
