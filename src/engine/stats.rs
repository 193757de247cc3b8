// src/engine/stats.rs

//! Running statistics across cycles.

use std::fmt;

/// Count, minimum, maximum and sum of a series of `u64` values.
///
/// An empty series reports zero for every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryStats {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub sum: u64,
}

impl SummaryStats {
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        values.into_iter().fold(SummaryStats::default(), |acc, v| {
            if acc.count == 0 {
                SummaryStats {
                    count: 1,
                    min: v,
                    max: v,
                    sum: v,
                }
            } else {
                SummaryStats {
                    count: acc.count + 1,
                    min: acc.min.min(v),
                    max: acc.max.max(v),
                    sum: acc.sum.saturating_add(v),
                }
            }
        })
    }
}

/// Counters and build durations owned by one orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStatistics {
    durations_ms: Vec<u64>,
    successes: u64,
    failures: u64,
}

impl CycleStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful build; returns its 1-based success index.
    pub fn record_success(&mut self, elapsed_ms: u64) -> u64 {
        self.successes += 1;
        self.durations_ms.push(elapsed_ms);
        self.successes
    }

    /// Record a failed build; returns its 1-based failure index.
    pub fn record_failure(&mut self) -> u64 {
        self.failures += 1;
        self.failures
    }

    /// Build durations in completion order, one per successful build.
    pub fn durations_ms(&self) -> &[u64] {
        &self.durations_ms
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn build_times(&self) -> SummaryStats {
        SummaryStats::of(self.durations_ms.iter().copied())
    }
}

/// The multi-line block printed every N-th successful build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsSummary {
    pub artifact_sizes_kb: SummaryStats,
    pub build_times_ms: SummaryStats,
    pub failed_builds: u64,
}

/// Printed instead of a failure count when no build failed.
pub const ALL_SUCCESS_MESSAGE: &str = "Great! Every build was a success!";

impl fmt::Display for StatisticsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes = &self.artifact_sizes_kb;
        let times = &self.build_times_ms;
        writeln!(
            f,
            "Artifact sizes: min {} kB, max {} kB, total {} kB",
            sizes.min, sizes.max, sizes.sum
        )?;
        writeln!(
            f,
            "Build times: min {} ms, max {} ms, total {} ms",
            times.min, times.max, times.sum
        )?;
        if self.failed_builds == 0 {
            write!(f, "{ALL_SUCCESS_MESSAGE}")
        } else {
            write!(f, "{} builds failed", self.failed_builds)
        }
    }
}
