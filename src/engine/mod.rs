// src/engine/mod.rs

//! Orchestration engine for wad.
//!
//! This module ties together:
//! - the cycle bookkeeping (counters, durations, summary threshold)
//! - the trigger queue (what happens when triggers arrive mid-cycle)
//! - the runtime loop that reacts to:
//!   - file-change triggers from the poller
//!   - manual triggers from the operator
//!   - shutdown signals
//!
//! The pure state machine lives in [`core`]; the async shell that talks to
//! the build runner and copier is [`cycle`]; [`runtime`] is the single
//! consumer of the trigger channel.

use std::fmt;

/// Why a cycle was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The explicit build-and-deploy at startup.
    Startup,
    /// The watched tree's fingerprint changed.
    FileChange,
    /// The operator asked for a rebuild on the console.
    Manual,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriggerReason::Startup => "startup",
            TriggerReason::FileChange => "file-change",
            TriggerReason::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Events flowing into the runtime from the poller, the manual listener and
/// the signal handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Run one build/deploy cycle.
    Triggered { reason: TriggerReason },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod cycle;
pub mod queue;
pub mod runtime;
pub mod stats;

pub use core::{CoreCommand, CycleCore, CycleState, CycleStep, CycleVerdict};
pub use cycle::{CycleOrchestrator, CycleReport};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
pub use stats::{CycleStatistics, StatisticsSummary, SummaryStats};
