// src/config/mod.rs

//! Configuration loading and validation for the `cmdgate` driver.
//!
//! - `model.rs`: the TOML-backed data model (raw + validated).
//! - `loader.rs`: reading a config file from disk.
//! - `validate.rs`: turning a raw config into a validated one.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, DispatcherKind, Outcome, RawConfigFile, ScenarioConfig};
