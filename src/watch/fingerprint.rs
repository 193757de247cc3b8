// src/watch/fingerprint.rs

//! Order-independent fingerprint of a directory tree.
//!
//! Every regular file contributes a 64-bit value derived from its relative
//! path, size and modification time. The values are combined with wrapping
//! addition, so the aggregate does not depend on the order in which the
//! filesystem enumerates entries, and adding, removing or changing any single
//! file moves the aggregate (up to hash collisions).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::Context;
use blake3::Hasher;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, trace};

use crate::errors::{Result, WadError};
use crate::fs::{FileStamp, FileSystem};

/// Opaque summary of a directory tree. Only meaningful for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint of a tree without files.
    pub const EMPTY: Fingerprint = Fingerprint(0);

    pub fn value(self) -> u64 {
        self.0
    }

    fn combine(self, file_value: u64) -> Self {
        Fingerprint(self.0.wrapping_add(file_value))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Computes fingerprints for one root, optionally ignoring excluded paths.
#[derive(Clone)]
pub struct Fingerprinter {
    root: PathBuf,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for Fingerprinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fingerprinter")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Fingerprinter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: None,
        }
    }

    /// Like [`Fingerprinter::new`], but files whose path relative to `root`
    /// matches one of `patterns` do not contribute.
    pub fn with_excludes(root: impl Into<PathBuf>, patterns: &[String]) -> anyhow::Result<Self> {
        let exclude = if patterns.is_empty() {
            None
        } else {
            Some(build_globset(patterns).context("building exclude globset")?)
        };
        Ok(Self {
            root: root.into(),
            exclude,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fingerprint the tree as it is right now.
    ///
    /// Fails only if the root itself is missing or unreadable. A file that
    /// disappears between enumeration and stat counts as absent.
    pub fn compute(&self, fs: &dyn FileSystem) -> Result<Fingerprint> {
        if !fs.is_dir(&self.root) {
            return Err(WadError::WatchRoot {
                path: self.root.clone(),
                reason: "not an existing directory".to_string(),
            });
        }

        let files = fs.files_under(&self.root).map_err(|e| WadError::WatchRoot {
            path: self.root.clone(),
            reason: e.to_string(),
        })?;

        let mut aggregate = Fingerprint::EMPTY;
        let mut counted = 0usize;

        for path in files {
            let rel = relative_str(&self.root, &path);
            if self.is_excluded(&rel) {
                trace!(path = %rel, "excluded from fingerprint");
                continue;
            }
            match fs.stamp(&path) {
                Ok(stamp) => {
                    aggregate = aggregate.combine(file_value(&rel, &stamp));
                    counted += 1;
                }
                Err(err) => {
                    debug!(path = %rel, error = %err, "file vanished during scan; treating as absent");
                }
            }
        }

        debug!(root = ?self.root, files = counted, fingerprint = %aggregate, "computed fingerprint");
        Ok(aggregate)
    }

    fn is_excluded(&self, rel: &str) -> bool {
        self.exclude.as_ref().is_some_and(|set| set.is_match(rel))
    }
}

/// Fingerprint `root` without any exclusions.
pub fn fingerprint(fs: &dyn FileSystem, root: &Path) -> Result<Fingerprint> {
    Fingerprinter::new(root).compute(fs)
}

/// Per-file contribution: the first 8 bytes of
/// `blake3(rel_path 0x00 size mtime)`.
pub fn file_value(rel_path: &str, stamp: &FileStamp) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(rel_path.as_bytes());
    hasher.update(&[0]);
    hasher.update(&stamp.len.to_le_bytes());

    match stamp.modified.map(|t| t.duration_since(UNIX_EPOCH)) {
        Some(Ok(after)) => {
            hasher.update(&[1]);
            hasher.update(&after.as_nanos().to_le_bytes());
        }
        Some(Err(before)) => {
            hasher.update(&[2]);
            hasher.update(&before.duration().as_nanos().to_le_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }

    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

/// Path of `path` relative to `root`, with forward slashes.
fn relative_str(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::{mtime, MockFileSystem};

    fn three_file_tree(fs: &MockFileSystem) {
        fs.add_file_with_mtime("proj/a.java", "class A {}", mtime(100));
        fs.add_file_with_mtime("proj/pkg/b.java", "class B {}", mtime(200));
        fs.add_file_with_mtime("proj/pkg/deep/c.xml", "<c/>", mtime(300));
    }

    fn fp(fs: &MockFileSystem) -> Fingerprint {
        fingerprint(fs, Path::new("proj")).unwrap()
    }

    #[test]
    fn stable_across_repeated_scans() {
        let fs = MockFileSystem::new();
        three_file_tree(&fs);
        assert_eq!(fp(&fs), fp(&fs));
    }

    #[test]
    fn independent_of_enumeration_order() {
        let forward = MockFileSystem::new();
        three_file_tree(&forward);

        let reversed = MockFileSystem::new();
        reversed.add_file_with_mtime("proj/pkg/deep/c.xml", "<c/>", mtime(300));
        reversed.add_file_with_mtime("proj/pkg/b.java", "class B {}", mtime(200));
        reversed.add_file_with_mtime("proj/a.java", "class A {}", mtime(100));

        assert_ne!(
            forward.files_under(Path::new("proj")).unwrap(),
            reversed.files_under(Path::new("proj")).unwrap()
        );
        assert_eq!(fp(&forward), fp(&reversed));
    }

    #[test]
    fn any_single_mutation_changes_the_fingerprint() {
        let fs = MockFileSystem::new();
        three_file_tree(&fs);
        let base = fp(&fs);

        fs.add_file_with_mtime("proj/new.java", "", mtime(1));
        let added = fp(&fs);
        assert_ne!(base, added);
        fs.remove("proj/new.java");
        assert_eq!(base, fp(&fs));

        fs.remove("proj/pkg/b.java");
        assert_ne!(base, fp(&fs));
        fs.add_file_with_mtime("proj/pkg/b.java", "class B {}", mtime(200));
        assert_eq!(base, fp(&fs));

        fs.add_file_with_mtime("proj/a.java", "class A { int x; }", mtime(100));
        assert_ne!(base, fp(&fs));
        fs.add_file_with_mtime("proj/a.java", "class A {}", mtime(100));
        assert_eq!(base, fp(&fs));

        fs.touch("proj/pkg/deep/c.xml", mtime(301));
        assert_ne!(base, fp(&fs));
    }

    #[test]
    fn rename_changes_the_fingerprint() {
        let fs = MockFileSystem::new();
        fs.add_file_with_mtime("proj/a.java", "x", mtime(5));
        let before = fp(&fs);

        fs.remove("proj/a.java");
        fs.add_file_with_mtime("proj/b.java", "x", mtime(5));
        assert_ne!(before, fp(&fs));
    }

    #[test]
    fn vanished_file_counts_as_absent() {
        let fs = MockFileSystem::new();
        three_file_tree(&fs);
        let full = fp(&fs);

        fs.vanish_on_stamp("proj/pkg/b.java");
        let racing = fp(&fs);

        let without = MockFileSystem::new();
        without.add_file_with_mtime("proj/a.java", "class A {}", mtime(100));
        without.add_file_with_mtime("proj/pkg/deep/c.xml", "<c/>", mtime(300));

        assert_ne!(full, racing);
        assert_eq!(racing, fp(&without));
    }

    #[test]
    fn empty_and_missing_roots() {
        let fs = MockFileSystem::new();
        fs.add_dir("empty");
        assert_eq!(fingerprint(&fs, Path::new("empty")).unwrap(), Fingerprint::EMPTY);

        match fingerprint(&fs, Path::new("missing")) {
            Err(WadError::WatchRoot { path, .. }) => assert_eq!(path, PathBuf::from("missing")),
            other => panic!("expected WatchRoot error, got {other:?}"),
        }
    }

    #[test]
    fn excluded_paths_do_not_contribute() {
        let fs = MockFileSystem::new();
        three_file_tree(&fs);
        let fingerprinter =
            Fingerprinter::with_excludes("proj", &["**/*.swp".to_string()]).unwrap();
        let base = fingerprinter.compute(&fs).unwrap();

        fs.add_file("proj/pkg/.b.java.swp", "editor state");
        assert_eq!(base, fingerprinter.compute(&fs).unwrap());
        assert_ne!(base, fp(&fs));
    }
}
