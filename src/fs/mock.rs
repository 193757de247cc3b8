// src/fs/mock.rs

use super::{FileStamp, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        content: Vec<u8>,
        modified: SystemTime,
    },
    Dir(Vec<String>), // child names, in insertion order
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths that are still listed by `files_under` but fail on `stamp`,
    /// mimicking a file deleted between enumeration and stat.
    vanishing: HashSet<PathBuf>,
}

/// In-memory filesystem.
///
/// Directory listings keep insertion order, so two mocks populated in a
/// different order enumerate the same tree differently.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

/// Deterministic mtime for mock files: `secs` after the Unix epoch.
pub fn mtime(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.lock()
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));
        fs
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Add (or replace) a file with a fixed mtime of `mtime(0)`.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.add_file_with_mtime(path, content, mtime(0));
    }

    pub fn add_file_with_mtime(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.lock();
        state.entries.insert(
            path.clone(),
            MockEntry::File {
                content: content.into(),
                modified,
            },
        );
        link_into_parent(&mut state.entries, &path);
    }

    /// Create an empty directory (and its parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Change a file's mtime without touching its content.
    pub fn touch(&self, path: impl AsRef<Path>, modified: SystemTime) {
        let mut state = self.lock();
        if let Some(MockEntry::File { modified: m, .. }) = state.entries.get_mut(path.as_ref()) {
            *m = modified;
        }
    }

    /// Remove a file from the tree.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.lock();
        state.entries.remove(path);
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let parent = normalize_parent(parent);
            if let Some(MockEntry::Dir(children)) = state.entries.get_mut(parent) {
                children.retain(|c| c.as_str() != name.to_string_lossy());
            }
        }
    }

    /// Keep listing `path` but fail when it is stat-ed.
    pub fn vanish_on_stamp(&self, path: impl AsRef<Path>) {
        self.lock().vanishing.insert(path.as_ref().to_path_buf());
    }

    /// Content of a file, if present.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().entries.get(path.as_ref()) {
            Some(MockEntry::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }
}

fn normalize_parent(parent: &Path) -> &Path {
    if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    }
}

fn link_into_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = path.parent() else {
        return;
    };
    let parent = normalize_parent(parent);
    if parent == path {
        return;
    }

    ensure_dir_entry(entries, parent);
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    link_into_parent(entries, path);
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // Mock paths are already canonical.
        Ok(path.to_path_buf())
    }

    fn files_under(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let state = self.lock();
        if !matches!(state.entries.get(root), Some(MockEntry::Dir(_))) {
            return Err(anyhow!("Not a directory or not found: {:?}", root));
        }

        let mut files = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let Some(MockEntry::Dir(children)) = state.entries.get(&dir) else {
                continue;
            };
            for name in children {
                let path = dir.join(name);
                match state.entries.get(&path) {
                    Some(MockEntry::File { .. }) => files.push(path),
                    Some(MockEntry::Dir(_)) => stack.push(path),
                    None => {}
                }
            }
        }
        Ok(files)
    }

    fn stamp(&self, path: &Path) -> Result<FileStamp> {
        let state = self.lock();
        if state.vanishing.contains(path) {
            return Err(anyhow!("File not found: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::File { content, modified }) => Ok(FileStamp {
                len: content.len() as u64,
                modified: Some(*modified),
            }),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let content = self
            .read(from)
            .ok_or_else(|| anyhow!("File not found: {:?}", from))?;
        if let Some(parent) = to.parent() {
            if !self.is_dir(normalize_parent(parent)) {
                return Err(anyhow!("Parent directory missing: {:?}", parent));
            }
        }
        let len = content.len() as u64;
        self.add_file_with_mtime(to, content, SystemTime::now());
        Ok(len)
    }
}
