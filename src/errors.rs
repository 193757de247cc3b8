// src/errors.rs

//! Crate-wide error type and aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WadError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Watch root {path:?} is not usable: {reason}")]
    WatchRoot { path: PathBuf, reason: String },

    #[error("Build could not be invoked: {0}")]
    BuildInvocation(String),

    #[error("Artifact not found: {0:?}")]
    ArtifactMissing(PathBuf),

    #[error("A build/deploy cycle is already in flight")]
    CycleInFlight,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WadError {
    /// Short, stable name of the error class, used when logging failures
    /// that are reported but not propagated.
    pub fn class(&self) -> &'static str {
        match self {
            WadError::ConfigError(_) => "ConfigError",
            WadError::IoError(_) => "IoError",
            WadError::TomlError(_) => "TomlError",
            WadError::WatchRoot { .. } => "WatchRoot",
            WadError::BuildInvocation(_) => "BuildInvocation",
            WadError::ArtifactMissing(_) => "ArtifactMissing",
            WadError::CycleInFlight => "CycleInFlight",
            WadError::Other(_) => "Other",
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WadError>;
