// src/engine/core.rs

//! Pure cycle state machine.
//!
//! `CycleCore` decides what a finished build means: which counter moves,
//! whether a duration is recorded, whether the statistics block is due and
//! whether the artifact should be deployed. It performs no IO and owns no
//! channels, so it can be driven directly from unit tests; the async shell in
//! [`crate::engine::cycle`] executes the commands it returns.

use std::time::Duration;

use tracing::{debug, warn};

use crate::build::BuildVerdict;
use crate::engine::stats::CycleStatistics;
use crate::errors::{Result, WadError};

/// Whether a cycle is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

/// Outcome of a completed build, as reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleVerdict {
    Succeeded { index: u64, elapsed_ms: u64 },
    Failed { index: u64, exit_code: i32 },
}

/// Work the shell must perform after a build, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Print the statistics block.
    EmitSummary,
    /// Copy the artifact to every deployment target.
    Deploy,
}

/// Decision returned by the core after a build finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStep {
    pub verdict: CycleVerdict,
    pub commands: Vec<CoreCommand>,
}

#[derive(Debug)]
pub struct CycleCore {
    state: CycleState,
    stats: CycleStatistics,
    summary_every: usize,
}

impl CycleCore {
    /// `summary_every` is clamped to at least 1.
    pub fn new(summary_every: usize) -> Self {
        Self {
            state: CycleState::Idle,
            stats: CycleStatistics::new(),
            summary_every: summary_every.max(1),
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn statistics(&self) -> &CycleStatistics {
        &self.stats
    }

    pub fn summary_every(&self) -> usize {
        self.summary_every
    }

    /// Idle -> Running.
    pub fn begin(&mut self) -> Result<()> {
        match self.state {
            CycleState::Idle => {
                self.state = CycleState::Running;
                Ok(())
            }
            CycleState::Running => Err(WadError::CycleInFlight),
        }
    }

    /// Running -> Idle after the build process returned an exit status.
    pub fn finish(&mut self, build: BuildVerdict, elapsed: Duration) -> CycleStep {
        if self.state != CycleState::Running {
            warn!("cycle finished without being started");
        }
        self.state = CycleState::Idle;

        if !build.success() {
            let index = self.stats.record_failure();
            debug!(index, exit_code = build.exit_code, "build failed");
            return CycleStep {
                verdict: CycleVerdict::Failed {
                    index,
                    exit_code: build.exit_code,
                },
                commands: Vec::new(),
            };
        }

        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let index = self.stats.record_success(elapsed_ms);

        let mut commands = Vec::with_capacity(2);
        if self.stats.durations_ms().len() % self.summary_every == 0 {
            commands.push(CoreCommand::EmitSummary);
        }
        commands.push(CoreCommand::Deploy);

        CycleStep {
            verdict: CycleVerdict::Succeeded { index, elapsed_ms },
            commands,
        }
    }

    /// Running -> Idle when the build could not be invoked at all. No
    /// counter moves.
    pub fn abort(&mut self) {
        self.state = CycleState::Idle;
    }
}
