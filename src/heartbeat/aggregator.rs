//! Debounced intake of editor actions.
//!
//! Continuous activity on one file is reported at most once per
//! [`FREQUENCY`](crate::FREQUENCY) unless the file is saved; every save is recorded.

use crate::heartbeat::queue::HeartbeatQueue;
use crate::heartbeat::types::{Heartbeat, Language};
use crate::stats::{create_shared_stats, SharedActivityStats};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Default)]
struct DebounceState {
    last_entity: Option<String>,
    last_accepted_at_millis: i64,
}

/// Turns editor actions into queued heartbeats.
pub struct EventAggregator {
    queue: HeartbeatQueue,
    clock: Arc<dyn Clock>,
    frequency: Duration,
    state: Mutex<DebounceState>,
    stats: SharedActivityStats,
}

impl EventAggregator {
    /// Create an aggregator on the system clock with the default debounce window.
    pub fn new(queue: HeartbeatQueue) -> Self {
        Self::with_clock(queue, Arc::new(SystemClock))
    }

    pub fn with_clock(queue: HeartbeatQueue, clock: Arc<dyn Clock>) -> Self {
        Self {
            queue,
            clock,
            frequency: Duration::from_secs(crate::FREQUENCY),
            state: Mutex::new(DebounceState::default()),
            stats: create_shared_stats(),
        }
    }

    /// Count intake into `stats` instead of a private counter set.
    pub fn with_stats(mut self, stats: SharedActivityStats) -> Self {
        self.stats = stats;
        self
    }

    /// Record an editor action on `path`.
    ///
    /// `language_hint` is the editor mode's default file extension. Returns
    /// whether a heartbeat was queued; non-write actions on the file that was
    /// last reported are dropped until the debounce window has passed.
    pub fn append(
        &self,
        project: Option<&str>,
        path: &str,
        language_hint: &str,
        is_write: bool,
    ) -> bool {
        let now = self.clock.now();
        let now_millis = now.timestamp_millis();

        // Poisoning only means another producer panicked mid-update; the state is still usable.
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let same_entity = state.last_entity.as_deref() == Some(path);
        let elapsed = now_millis.saturating_sub(state.last_accepted_at_millis);
        let within_window = elapsed < self.frequency.as_millis() as i64;

        if !is_write && same_entity && within_window {
            self.stats.record_debounced();
            return false;
        }

        state.last_entity = Some(path.to_string());
        state.last_accepted_at_millis = now_millis;

        let heartbeat = Heartbeat::new(
            path,
            now,
            is_write,
            project.map(str::to_string),
            Some(Language::from_extension(language_hint)),
        );
        self.queue.push(heartbeat);
        self.stats.record_accepted();
        true
    }

    pub fn queue(&self) -> &HeartbeatQueue {
        &self.queue
    }

    pub fn stats(&self) -> &SharedActivityStats {
        &self.stats
    }
}
