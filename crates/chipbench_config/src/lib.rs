//! Parsing and validation of `chipbench.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`ProjectConfig`]. Environment variables are never read implicitly: callers
//! collect them once with [`EnvOverrides::from_env`] and apply them explicitly.
//! The resolve step turns a configuration into the source list handed to a
//! build backend and the parameters handed to a scenario.

#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use env::EnvOverrides;
pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{
    model_variant, resolve_build, resolve_scenario, resolve_time_limit, ResolvedBuild,
};
pub use types::*;
