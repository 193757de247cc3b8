// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use walkdir::WalkDir;

pub mod mock;

/// Size and modification time of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub len: u64,
    /// `None` on platforms/filesystems that do not report mtimes.
    pub modified: Option<SystemTime>,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Every regular file below `root`, recursively. Symlinks are not
    /// followed. Entries that cannot be read while walking are skipped; only
    /// an unreadable `root` is an error.
    fn files_under(&self, root: &Path) -> Result<Vec<PathBuf>>;

    /// Size and modification time of `path`.
    fn stamp(&self, path: &Path) -> Result<FileStamp>;

    /// Copy `from` to `to`, replacing `to`. Returns the number of bytes copied.
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;
}

/// Implementation backed by `std::fs` and `walkdir`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {:?}", path))
    }

    fn files_under(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(false) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        files.push(entry.into_path());
                    }
                }
                Err(err) if err.depth() == 0 => {
                    return Err(anyhow!("walking {:?}: {}", root, err));
                }
                Err(err) => {
                    // Typically a file removed while we were walking.
                    debug!(error = %err, "skipping unreadable entry");
                }
            }
        }

        Ok(files)
    }

    fn stamp(&self, path: &Path) -> Result<FileStamp> {
        let meta =
            fs::symlink_metadata(path).with_context(|| format!("reading metadata of {:?}", path))?;
        Ok(FileStamp {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        fs::copy(from, to).with_context(|| format!("copying {:?} to {:?}", from, to))
    }
}
