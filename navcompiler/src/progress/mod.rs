//! Progress reporting and cooperative cancellation.
//!
//! The resolver runs on a single thread and never blocks on the reporter. It
//! calls [`ProgressReporter::report_progress`] at batch boundaries and stops
//! as soon as the reporter answers `true` (aborted).
//!
//! # Implementors
//!
//! - [`NoProgress`] - never reports, never aborts
//! - [`CancelOnFlag`] - aborts once a shared [`CancellationToken`] is set
//! - The CLI progress bar (in the `navcompiler` binary)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default minimum wall time between two progress reports.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_millis(500);

/// Default number of candidate records between throttle checks.
pub const DEFAULT_BATCH_ROWS: u64 = 1000;

/// Receives progress updates and decides whether the run should stop.
pub trait ProgressReporter {
    /// Report progress; one call consumes one progress step.
    ///
    /// `silent` asks the reporter to advance without replacing the visible
    /// message. Returns `true` when the run must abort.
    fn report_progress(&mut self, message: &str, silent: bool) -> bool;

    /// Advance by `steps` without a message, for steps skipped when the run
    /// finishes or aborts early.
    fn increase_current(&mut self, steps: u64);
}

impl<T: ProgressReporter + ?Sized> ProgressReporter for &mut T {
    fn report_progress(&mut self, message: &str, silent: bool) -> bool {
        (**self).report_progress(message, silent)
    }

    fn increase_current(&mut self, steps: u64) {
        (**self).increase_current(steps)
    }
}

/// Reporter that ignores progress and never aborts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report_progress(&mut self, _message: &str, _silent: bool) -> bool {
        false
    }

    fn increase_current(&mut self, _steps: u64) {}
}

/// Shared cancellation flag.
///
/// Cloning shares the flag, so a signal handler can hold one clone while the
/// resolver's reporter holds another.
#[derive(Debug, Default, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Reporter that counts steps and aborts once its token is cancelled.
#[derive(Debug, Clone)]
pub struct CancelOnFlag {
    token: CancellationToken,
    current: u64,
    last_message: String,
}

impl CancelOnFlag {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            current: 0,
            last_message: String::new(),
        }
    }

    /// Steps reported or credited so far.
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }
}

impl ProgressReporter for CancelOnFlag {
    fn report_progress(&mut self, message: &str, silent: bool) -> bool {
        self.current += 1;
        if !silent {
            self.last_message = message.to_string();
        }
        self.token.is_cancelled()
    }

    fn increase_current(&mut self, steps: u64) {
        self.current += steps;
    }
}

/// Decides when the driver should call the reporter.
///
/// A report is due every `batch_rows` records, but only if at least
/// `min_interval` of wall time passed since the previous report. This keeps
/// reporting near twice per second regardless of how fast records arrive.
#[derive(Debug, Clone)]
pub struct ReportThrottle {
    batch_rows: u64,
    min_interval: Duration,
    rows: u64,
    last_report: Option<Instant>,
}

impl ReportThrottle {
    pub fn new(batch_rows: u64, min_interval: Duration) -> Self {
        Self {
            batch_rows: batch_rows.max(1),
            min_interval,
            rows: 0,
            last_report: None,
        }
    }

    /// Count one record; returns `true` when a report is due.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Same as [`tick`](Self::tick) with an explicit clock, for testing.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        self.rows += 1;
        if self.rows % self.batch_rows != 0 {
            return false;
        }

        let due = self
            .last_report
            .map_or(true, |last| now.duration_since(last) >= self.min_interval);
        if due {
            self.last_report = Some(now);
        }
        due
    }

    /// Records counted so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl Default for ReportThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_ROWS, DEFAULT_REPORT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_progress_never_aborts() {
        let mut reporter = NoProgress;
        assert!(!reporter.report_progress("anything", false));
    }

    #[test]
    fn test_cancel_on_flag() {
        let token = CancellationToken::new();
        let mut reporter = CancelOnFlag::new(token.clone());

        assert!(!reporter.report_progress("J1", false));
        assert!(!reporter.report_progress("J2", true));
        assert_eq!(reporter.last_message(), "J1");

        token.cancel();
        assert!(reporter.report_progress("J3", false));
        reporter.increase_current(7);
        assert_eq!(reporter.current(), 10);
    }

    #[test]
    fn test_token_clones_share_state() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_throttle_batches_rows() {
        let mut throttle = ReportThrottle::new(3, Duration::ZERO);
        let start = Instant::now();
        let due: Vec<_> = (0..7).map(|_| throttle.tick_at(start)).collect();
        assert_eq!(due, vec![false, false, true, false, false, true, false]);
        assert_eq!(throttle.rows(), 7);
    }

    #[test]
    fn test_throttle_respects_interval() {
        let mut throttle = ReportThrottle::new(1, Duration::from_millis(500));
        let start = Instant::now();

        assert!(throttle.tick_at(start));
        assert!(!throttle.tick_at(start + Duration::from_millis(100)));
        assert!(!throttle.tick_at(start + Duration::from_millis(499)));
        assert!(throttle.tick_at(start + Duration::from_millis(500)));
        assert!(!throttle.tick_at(start + Duration::from_millis(600)));
    }

    #[test]
    fn test_zero_batch_is_clamped() {
        let mut throttle = ReportThrottle::new(0, Duration::ZERO);
        assert!(throttle.tick_at(Instant::now()));
    }
}
