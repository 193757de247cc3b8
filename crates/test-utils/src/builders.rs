#![allow(dead_code)]

use std::path::PathBuf;

use wad::build::BuildRunner;
use wad::config::{ConfigFile, RawConfigFile};
use wad::deploy::ArtifactCopier;
use wad::engine::CycleOrchestrator;
use wad::report::Reporter;

use crate::fakes::SharedBuffer;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the TOML defaults plus one artifact and one target, which is
/// the minimum validation accepts.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.build.artifact = Some(PathBuf::from("target/app.war"));
        config.deploy.targets = vec![PathBuf::from("deploy")];
        Self { config }
    }

    pub fn watch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.watch.dir = dir.into();
        self
    }

    pub fn poll_interval(mut self, interval: &str) -> Self {
        self.config.watch.poll_interval = interval.to_string();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn build_cmd(mut self, cmd: &str) -> Self {
        self.config.build.cmd = cmd.to_string();
        self
    }

    pub fn artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.build.artifact = Some(path.into());
        self
    }

    /// Replace the target list.
    pub fn targets<I, P>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.deploy.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn summary_every(mut self, n: usize) -> Self {
        self.config.stats.summary_every = n;
        self
    }

    pub fn queue_length(mut self, n: usize) -> Self {
        self.config.runtime.queue_length = n;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrator whose status lines go to a [`SharedBuffer`].
pub fn orchestrator_with_output<B, C>(
    builder: B,
    copier: C,
    summary_every: usize,
) -> (CycleOrchestrator<B, C>, SharedBuffer)
where
    B: BuildRunner,
    C: ArtifactCopier,
{
    let out = SharedBuffer::new();
    let reporter = Reporter::new(Box::new(out.clone()));
    (
        CycleOrchestrator::new(builder, copier, reporter, summary_every),
        out,
    )
}
