// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// dir = "src/main"
/// poll_interval = "500ms"
/// exclude = ["**/*.swp"]
///
/// [build]
/// cmd = "mvn -q clean install"
/// artifact = "target/app.war"
///
/// [deploy]
/// targets = ["/opt/server/autodeploy"]
/// ```
///
/// All sections are optional and have reasonable defaults; semantic checks
/// happen when converting into a [`ConfigFile`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub deploy: DeploySection,

    #[serde(default)]
    pub stats: StatsSection,

    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory tree whose fingerprint is polled.
    #[serde(default = "default_watch_dir")]
    pub dir: PathBuf,

    /// Duration string with a `ms`, `s`, `m` or `h` suffix.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Glob patterns (relative to `dir`) that never affect the fingerprint.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_watch_dir() -> PathBuf {
    PathBuf::from("src/main")
}

fn default_poll_interval() -> String {
    "500ms".to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            dir: default_watch_dir(),
            poll_interval: default_poll_interval(),
            exclude: Vec::new(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Shell command producing the artifact.
    #[serde(default = "default_build_cmd")]
    pub cmd: String,

    /// Working directory of the build command.
    #[serde(default = "default_build_dir")]
    pub dir: PathBuf,

    /// The file copied to every deployment target after a successful build.
    #[serde(default)]
    pub artifact: Option<PathBuf>,
}

fn default_build_cmd() -> String {
    "mvn -q clean install".to_string()
}

fn default_build_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            cmd: default_build_cmd(),
            dir: default_build_dir(),
            artifact: None,
        }
    }
}

/// `[deploy]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploySection {
    /// Ordered deployment targets. Directories receive the artifact under its
    /// own file name; anything else is treated as the destination file.
    #[serde(default)]
    pub targets: Vec<PathBuf>,
}

/// `[stats]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsSection {
    /// Print the statistics block after every N-th successful build.
    #[serde(default = "default_summary_every")]
    pub summary_every: usize,
}

fn default_summary_every() -> usize {
    10
}

impl Default for StatsSection {
    fn default() -> Self {
        Self {
            summary_every: default_summary_every(),
        }
    }
}

/// `[runtime]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeSection {
    /// Maximum number of follow-up cycles remembered while a cycle runs.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,
}

fn default_queue_length() -> usize {
    1
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            queue_length: default_queue_length(),
        }
    }
}

/// Validated, effective configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, so every instance has
/// passed validation.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    watch_dir: PathBuf,
    poll_interval: Duration,
    exclude: Vec<String>,
    build_cmd: String,
    build_dir: PathBuf,
    artifact: PathBuf,
    targets: Vec<PathBuf>,
    summary_every: usize,
    queue_length: usize,
}

impl ConfigFile {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_unchecked(
        watch_dir: PathBuf,
        poll_interval: Duration,
        exclude: Vec<String>,
        build_cmd: String,
        build_dir: PathBuf,
        artifact: PathBuf,
        targets: Vec<PathBuf>,
        summary_every: usize,
        queue_length: usize,
    ) -> Self {
        Self {
            watch_dir,
            poll_interval,
            exclude,
            build_cmd,
            build_dir,
            artifact,
            targets,
            summary_every,
            queue_length,
        }
    }

    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn build_cmd(&self) -> &str {
        &self.build_cmd
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    pub fn summary_every(&self) -> usize {
        self.summary_every
    }

    pub fn queue_length(&self) -> usize {
        self.queue_length
    }
}
