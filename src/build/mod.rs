// src/build/mod.rs

//! Build invocation.
//!
//! The orchestrator talks to a [`BuildRunner`] rather than spawning
//! processes itself, so tests can substitute a scripted fake.
//!
//! - [`command`] provides [`CommandBuildRunner`], which runs a shell command
//!   with `tokio::process`.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

pub mod command;

pub use command::CommandBuildRunner;

/// Exit status of a build that did run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildVerdict {
    /// Process exit code; `-1` when the process was killed by a signal.
    pub exit_code: i32,
}

impl BuildVerdict {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait abstracting how the project gets built.
///
/// `Ok` means the build ran (successfully or not); `Err` means it could not
/// be invoked at all.
pub trait BuildRunner: Send {
    fn build(&mut self) -> Pin<Box<dyn Future<Output = Result<BuildVerdict>> + Send + '_>>;
}
