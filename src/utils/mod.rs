//! Configuration utilities
//!
//! [`toml_config`] loads and validates `deepr.toml` and resolves the
//! credentials a run needs.

pub mod toml_config;

pub use toml_config::{ConfigError, DeeprConfig};
