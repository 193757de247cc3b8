// src/deploy/mod.rs

//! Copying the built artifact to the deployment targets.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine::stats::SummaryStats;
use crate::errors::{Result, WadError};
use crate::fs::FileSystem;

/// One successful copy of the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRecord {
    pub destination: PathBuf,
    pub bytes: u64,
}

impl CopyRecord {
    pub fn kb(&self) -> u64 {
        self.bytes / 1024
    }
}

/// Trait abstracting how the artifact reaches its targets.
pub trait ArtifactCopier: Send {
    /// Copy the artifact to every configured target.
    fn copy(&mut self) -> Result<Vec<CopyRecord>>;

    /// Min/max/sum over the sizes (kB) of every copy made so far.
    fn size_statistics(&self) -> SummaryStats;
}

/// Copies one artifact file to an ordered, fixed list of targets.
///
/// A target that is an existing directory receives
/// `<target>/<artifact file name>`; any other target is the destination file
/// itself. A failing target is logged and skipped so the others still get
/// deployed.
#[derive(Debug)]
pub struct FsArtifactCopier {
    artifact: PathBuf,
    targets: Vec<PathBuf>,
    fs: Arc<dyn FileSystem>,
    sizes_kb: Vec<u64>,
}

impl FsArtifactCopier {
    pub fn new(artifact: impl Into<PathBuf>, targets: Vec<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            artifact: artifact.into(),
            targets,
            fs,
            sizes_kb: Vec::new(),
        }
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    fn destination_for(&self, target: &Path) -> PathBuf {
        match self.artifact.file_name() {
            Some(name) if self.fs.is_dir(target) => target.join(name),
            _ => target.to_path_buf(),
        }
    }
}

impl ArtifactCopier for FsArtifactCopier {
    fn copy(&mut self) -> Result<Vec<CopyRecord>> {
        if !self.fs.is_file(&self.artifact) {
            return Err(WadError::ArtifactMissing(self.artifact.clone()));
        }

        let mut records = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let destination = self.destination_for(target);
            match self.fs.copy(&self.artifact, &destination) {
                Ok(bytes) => {
                    let record = CopyRecord { destination, bytes };
                    debug!(destination = ?record.destination, kb = record.kb(), "artifact copied");
                    self.sizes_kb.push(record.kb());
                    records.push(record);
                }
                Err(err) => {
                    warn!(target = ?target, error = %err, "failed to copy artifact; skipping target");
                }
            }
        }

        Ok(records)
    }

    fn size_statistics(&self) -> SummaryStats {
        SummaryStats::of(self.sizes_kb.iter().copied())
    }
}
