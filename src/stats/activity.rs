//! Heartbeat flow counters.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current agent session.
#[derive(Debug)]
pub struct ActivityStats {
    /// Heartbeats accepted onto the queue
    heartbeats_accepted: AtomicU64,
    /// Actions dropped by the debounce rule
    heartbeats_debounced: AtomicU64,
    /// Batches handed to the CLI
    batches_dispatched: AtomicU64,
    /// Heartbeats handed to the CLI, primary and extra
    heartbeats_dispatched: AtomicU64,
    /// Batches lost to spawn or I/O failures
    batches_failed: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl ActivityStats {
    pub fn new() -> Self {
        Self {
            heartbeats_accepted: AtomicU64::new(0),
            heartbeats_debounced: AtomicU64::new(0),
            batches_dispatched: AtomicU64::new(0),
            heartbeats_dispatched: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    pub fn record_accepted(&self) {
        self.heartbeats_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_debounced(&self) {
        self.heartbeats_debounced.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch of `heartbeats` handed to the CLI.
    pub fn record_dispatched(&self, heartbeats: u64) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);
        self.heartbeats_dispatched
            .fetch_add(heartbeats, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            heartbeats_accepted: self.heartbeats_accepted.load(Ordering::Relaxed),
            heartbeats_debounced: self.heartbeats_debounced.load(Ordering::Relaxed),
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            heartbeats_dispatched: self.heartbeats_dispatched.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Heartbeats accepted: {}\n\
             - Actions debounced: {}\n\
             - Batches sent: {} ({} heartbeats)\n\
             - Batches failed: {}\n\
             - Session duration: {} seconds",
            stats.heartbeats_accepted,
            stats.heartbeats_debounced,
            stats.batches_dispatched,
            stats.heartbeats_dispatched,
            stats.batches_failed,
            stats.session_duration_secs
        )
    }
}

impl Default for ActivityStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the activity counters.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub heartbeats_accepted: u64,
    pub heartbeats_debounced: u64,
    pub batches_dispatched: u64,
    pub heartbeats_dispatched: u64,
    pub batches_failed: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared counters.
pub type SharedActivityStats = Arc<ActivityStats>;

pub fn create_shared_stats() -> SharedActivityStats {
    Arc::new(ActivityStats::new())
}
