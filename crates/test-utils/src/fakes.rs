use std::collections::VecDeque;
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wad::build::{BuildRunner, BuildVerdict};
use wad::deploy::{ArtifactCopier, CopyRecord};
use wad::engine::SummaryStats;
use wad::errors::{Result, WadError};

/// One scripted answer of [`FakeBuildRunner`].
#[derive(Debug, Clone)]
pub enum Scripted {
    Exit(i32),
    InvocationError(String),
}

/// A build runner that:
/// - answers from a script, then keeps succeeding once the script runs out
/// - optionally sleeps to simulate build time
/// - counts invocations
#[derive(Debug, Default)]
pub struct FakeBuildRunner {
    script: VecDeque<Scripted>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl FakeBuildRunner {
    pub fn always_ok() -> Self {
        Self::default()
    }

    pub fn with_exit_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            script: codes.into_iter().map(Scripted::Exit).collect(),
            ..Self::default()
        }
    }

    pub fn then(mut self, answer: Scripted) -> Self {
        self.script.push_back(answer);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared counter, readable after the runner moved into a runtime.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl BuildRunner for FakeBuildRunner {
    fn build(&mut self) -> Pin<Box<dyn Future<Output = Result<BuildVerdict>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.pop_front().unwrap_or(Scripted::Exit(0));
        let delay = self.delay;

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match next {
                Scripted::Exit(exit_code) => Ok(BuildVerdict { exit_code }),
                Scripted::InvocationError(msg) => Err(WadError::BuildInvocation(msg)),
            }
        })
    }
}

/// A copier that records how often it ran and reports a fixed artifact size.
#[derive(Debug)]
pub struct FakeCopier {
    size_kb: u64,
    missing_artifact: bool,
    sizes_kb: Vec<u64>,
}

impl FakeCopier {
    pub fn new(size_kb: u64) -> Self {
        Self {
            size_kb,
            missing_artifact: false,
            sizes_kb: Vec::new(),
        }
    }

    /// Every `copy` fails as if the build produced no artifact.
    pub fn missing_artifact() -> Self {
        Self {
            missing_artifact: true,
            ..Self::new(0)
        }
    }

    pub fn copies(&self) -> usize {
        self.sizes_kb.len()
    }
}

impl ArtifactCopier for FakeCopier {
    fn copy(&mut self) -> Result<Vec<CopyRecord>> {
        if self.missing_artifact {
            return Err(WadError::ArtifactMissing(PathBuf::from("target/app.war")));
        }
        self.sizes_kb.push(self.size_kb);
        Ok(vec![CopyRecord {
            destination: PathBuf::from("fake-target/app.war"),
            bytes: self.size_kb * 1024,
        }])
    }

    fn size_statistics(&self) -> SummaryStats {
        SummaryStats::of(self.sizes_kb.iter().copied())
    }
}

/// In-memory `Write` sink that can be cloned and inspected while shared.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
