// src/engine/cycle.rs

use std::fmt;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::build::BuildRunner;
use crate::deploy::ArtifactCopier;
use crate::engine::core::{CoreCommand, CycleCore, CycleVerdict};
use crate::engine::stats::{CycleStatistics, StatisticsSummary};
use crate::engine::TriggerReason;
use crate::report::Reporter;

/// What happened during one call to [`CycleOrchestrator::run_cycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    Succeeded {
        index: u64,
        elapsed_ms: u64,
        summary: Option<StatisticsSummary>,
        copies: usize,
    },
    Failed {
        index: u64,
        exit_code: i32,
    },
    /// The build could not be invoked; no counter moved.
    Aborted { class: &'static str },
}

/// Runs build -> deploy cycles and owns the statistics they produce.
///
/// Exclusive access (`&mut self`) is what keeps a single cycle in flight;
/// the runtime is the only caller once the loop is running.
pub struct CycleOrchestrator<B: BuildRunner, C: ArtifactCopier> {
    core: CycleCore,
    builder: B,
    copier: C,
    reporter: Reporter,
}

impl<B: BuildRunner, C: ArtifactCopier> fmt::Debug for CycleOrchestrator<B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleOrchestrator")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: BuildRunner, C: ArtifactCopier> CycleOrchestrator<B, C> {
    pub fn new(builder: B, copier: C, reporter: Reporter, summary_every: usize) -> Self {
        Self {
            core: CycleCore::new(summary_every),
            builder,
            copier,
            reporter,
        }
    }

    pub fn statistics(&self) -> &CycleStatistics {
        self.core.statistics()
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn copier(&self) -> &C {
        &self.copier
    }

    /// Current statistics block: artifact sizes from the copier, build times
    /// and failure count from the core.
    pub fn summary(&self) -> StatisticsSummary {
        let stats = self.core.statistics();
        StatisticsSummary {
            artifact_sizes_kb: self.copier.size_statistics(),
            build_times_ms: stats.build_times(),
            failed_builds: stats.failures(),
        }
    }

    /// Build, and on success deploy. Never fails: every problem is counted,
    /// logged or both.
    pub async fn run_cycle(&mut self, reason: TriggerReason) -> CycleReport {
        if self.core.begin().is_err() {
            // Only reachable if a previous `run_cycle` future was dropped mid-build.
            warn!("previous cycle was abandoned while running; resetting");
            self.core.abort();
            let _ = self.core.begin();
        }
        info!(%reason, "cycle started");

        let start = Instant::now();
        let verdict = match self.builder.build().await {
            Ok(verdict) => verdict,
            Err(err) => {
                error!(error_class = err.class(), error = %err, "build could not be invoked");
                self.core.abort();
                return CycleReport::Aborted { class: err.class() };
            }
        };

        let step = self.core.finish(verdict, start.elapsed());
        self.reporter.build_finished(&step.verdict);

        let mut summary = None;
        let mut copies = 0;
        for command in step.commands {
            match command {
                CoreCommand::EmitSummary => {
                    let block = self.summary();
                    self.reporter.summary(&block);
                    summary = Some(block);
                }
                CoreCommand::Deploy => copies = self.deploy(),
            }
        }

        match step.verdict {
            CycleVerdict::Succeeded { index, elapsed_ms } => CycleReport::Succeeded {
                index,
                elapsed_ms,
                summary,
                copies,
            },
            CycleVerdict::Failed { index, exit_code } => CycleReport::Failed { index, exit_code },
        }
    }

    fn deploy(&mut self) -> usize {
        let start = Instant::now();
        match self.copier.copy() {
            Ok(records) => {
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                self.reporter.deployed(elapsed_ms);
                info!(copies = records.len(), elapsed_ms, "artifact deployed");
                records.len()
            }
            Err(err) => {
                error!(error_class = err.class(), error = %err, "deployment failed");
                self.reporter.deploy_failed(&err.to_string());
                0
            }
        }
    }
}
