// src/report.rs

//! Operator-facing status lines.
//!
//! One line per build, one per deployment, and the statistics block every
//! N-th successful build. Diagnostics go through `tracing` instead.

use std::io::{self, Write};

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use tracing::debug;

use crate::engine::core::CycleVerdict;
use crate::engine::stats::StatisticsSummary;

const THUMBS_UP: &str = "\u{1F44D}";
const THUMBS_DOWN: &str = "\u{1F44E}";
const ROCKET: &str = "\u{1F680}";

/// Local wall-clock time as `HH:MM:SS`.
pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// `[12:04:59][3]👍 built in 1234 ms` or `[12:04:59][1] 👎 build failed (exit code 1)`.
pub fn build_line(timestamp: &str, verdict: &CycleVerdict) -> String {
    match verdict {
        CycleVerdict::Succeeded { index, elapsed_ms } => {
            format!("[{timestamp}][{index}]{THUMBS_UP} built in {elapsed_ms} ms")
        }
        CycleVerdict::Failed { index, exit_code } => {
            format!("[{timestamp}][{index}] {THUMBS_DOWN} build failed (exit code {exit_code})")
        }
    }
}

/// `🚀  copied in 12 ms`.
pub fn deploy_line(elapsed_ms: u64) -> String {
    format!("{ROCKET}  copied in {elapsed_ms} ms")
}

/// Timestamp wrapped in ANSI cyan.
pub fn colored_timestamp(timestamp: &str) -> String {
    timestamp.cyan().to_string()
}

/// Writes status lines to a sink (stdout in production).
pub struct Reporter {
    out: Box<dyn Write + Send>,
    color: bool,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    /// Plain output, no colours.
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out, color: false }
    }

    /// Stdout, with a coloured timestamp when stdout is a terminal.
    pub fn stdout() -> Self {
        let color = io::stdout().is_terminal();
        Self::new(Box::new(io::stdout())).with_color(color)
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn build_finished(&mut self, verdict: &CycleVerdict) {
        let ts = timestamp();
        let ts = if self.color { colored_timestamp(&ts) } else { ts };
        let line = build_line(&ts, verdict);
        self.emit(&line);
    }

    pub fn deployed(&mut self, elapsed_ms: u64) {
        self.emit(&deploy_line(elapsed_ms));
    }

    pub fn deploy_failed(&mut self, message: &str) {
        self.emit(&format!("{ROCKET}  deploy failed: {message}"));
    }

    pub fn summary(&mut self, summary: &StatisticsSummary) {
        self.emit(&summary.to_string());
    }

    fn emit(&mut self, text: &str) {
        let res = writeln!(self.out, "{text}").and_then(|_| self.out.flush());
        if let Err(err) = res {
            debug!(error = %err, "failed to write status line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_line_carries_index_glyph_and_time() {
        let line = build_line(
            "09:15:02",
            &CycleVerdict::Succeeded {
                index: 7,
                elapsed_ms: 1834,
            },
        );
        assert_eq!(line, "[09:15:02][7]\u{1F44D} built in 1834 ms");
    }

    #[test]
    fn failure_line_carries_failure_index() {
        let line = build_line(
            "23:59:59",
            &CycleVerdict::Failed {
                index: 2,
                exit_code: 1,
            },
        );
        assert!(line.starts_with("[23:59:59][2] \u{1F44E}"));
        assert!(line.ends_with("(exit code 1)"));
    }

    #[test]
    fn timestamp_is_hh_mm_ss() {
        let ts = timestamp();
        let parts: Vec<&str> = ts.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit())));
    }

    #[derive(Clone, Default)]
    struct Sink(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    const VERDICT: CycleVerdict = CycleVerdict::Succeeded {
        index: 1,
        elapsed_ms: 5,
    };

    #[test]
    fn colored_reporter_wraps_only_the_timestamp() {
        let sink = Sink::default();
        let mut reporter = Reporter::new(Box::new(sink.clone())).with_color(true);
        reporter.build_finished(&VERDICT);

        let text = sink.text();
        assert!(text.starts_with("[\u{1b}[36m"), "{text:?}");
        assert!(text.contains("\u{1b}[39m][1]\u{1F44D} built in 5 ms"), "{text:?}");
        assert_eq!(colored_timestamp("12:00:00"), "\u{1b}[36m12:00:00\u{1b}[39m");
    }

    #[test]
    fn plain_reporter_has_no_escape_codes() {
        let sink = Sink::default();
        let mut reporter = Reporter::new(Box::new(sink.clone()));
        reporter.build_finished(&VERDICT);
        reporter.deployed(3);

        let text = sink.text();
        assert!(!text.contains('\u{1b}'));
        assert!(text.ends_with("\u{1F680}  copied in 3 ms\n"));
    }
}
