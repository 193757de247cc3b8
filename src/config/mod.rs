// src/config/mod.rs

//! Configuration loading and validation for wad.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge CLI overrides (`loader.rs`).
//! - Validate paths, intervals and counters (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{apply_cli_overrides, load_and_validate, load_effective, load_from_path};
pub use model::{
    BuildSection, ConfigFile, DeploySection, RawConfigFile, RuntimeSection, StatsSection,
    WatchSection,
};
pub use validate::{parse_duration, validate_config};
