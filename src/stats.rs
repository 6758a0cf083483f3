// src/stats.rs
//! Query statistics for one dispatch

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Thread-safe counters shared by the workers of one dispatch
#[derive(Clone)]
pub struct DispatchStats {
    attempted: Arc<AtomicU64>,
    succeeded: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    entries: Arc<AtomicU64>,
    start_time: Instant,
}

/// Snapshot of a dispatch's counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub entries: u64,
    pub elapsed: Duration,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self {
            attempted: Arc::new(AtomicU64::new(0)),
            succeeded: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
            entries: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// A worker picked a query off the queue. Returns the new attempt count.
    pub fn record_attempt(&self) -> u64 {
        self.attempted.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_success(&self, entries: usize) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.entries.fetch_add(entries as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchSummary {
        DispatchSummary {
            attempted: self.attempted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            entries: self.entries.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for DispatchStats {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchSummary {
    /// Format as a one-line human-readable string
    pub fn format(&self) -> String {
        format!(
            "{} queries ({} ok, {} failed) | {} entries | {}",
            self.attempted,
            self.succeeded,
            self.failed,
            self.entries,
            format_elapsed(self.elapsed.as_secs())
        )
    }
}

/// Format an elapsed duration
pub fn format_elapsed(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
