// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Relative paths inside the file are resolved against the
/// directory containing it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let mut config: RawConfigFile = toml::from_str(&contents)?;
    resolve_relative_paths(&mut config, &config_base_dir(path));

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Build the effective configuration for a CLI invocation.
///
/// - `--config PATH` must exist.
/// - Without `--config`, `wad.toml` is used if present, otherwise all values
///   come from defaults plus flags.
/// - Flags always override file values.
pub fn load_effective(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = ?default_path, "using default config file");
                load_from_path(&default_path)?
            } else {
                debug!("no config file; using defaults and CLI flags");
                RawConfigFile::default()
            }
        }
    };

    apply_cli_overrides(&mut raw, args);
    ConfigFile::try_from(raw)
}

/// Apply command-line overrides on top of file values.
pub fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(dir) = &args.watch_dir {
        raw.watch.dir = dir.clone();
    }
    if let Some(interval) = &args.poll_interval {
        raw.watch.poll_interval = interval.clone();
    }
    if let Some(cmd) = &args.build_cmd {
        raw.build.cmd = cmd.clone();
    }
    if let Some(artifact) = &args.artifact {
        raw.build.artifact = Some(artifact.clone());
    }
    if !args.targets.is_empty() {
        raw.deploy.targets = args.targets.clone();
    }
}

/// Default config location: `wad.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("wad.toml")
}

/// Directory against which relative paths in a config file are resolved.
///
/// A bare file name (parent = "") resolves against the current directory,
/// which `Path::join` on an empty base already does.
fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::new(),
    }
}

fn resolve_relative_paths(cfg: &mut RawConfigFile, base: &Path) {
    if base.as_os_str().is_empty() {
        return;
    }
    let resolve = |p: &mut PathBuf| {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    };

    resolve(&mut cfg.watch.dir);
    resolve(&mut cfg.build.dir);
    if let Some(artifact) = cfg.build.artifact.as_mut() {
        resolve(artifact);
    }
    cfg.deploy.targets.iter_mut().for_each(resolve);
}
