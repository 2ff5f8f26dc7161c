//! Lifecycle tracking for fire-and-forget CLI processes.

use std::process::Child;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

struct TrackedChild {
    child: Child,
    started: Instant,
}

/// Children spawned without waiting, kept so they can be reaped, awaited or killed.
#[derive(Default)]
pub struct ProcessRegistry {
    children: Mutex<Vec<TrackedChild>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, child: Child) {
        self.lock().push(TrackedChild {
            child,
            started: Instant::now(),
        });
    }

    /// Drop every child that has exited. Returns how many were collected.
    pub fn reap(&self) -> usize {
        let mut children = self.lock();
        let before = children.len();
        children.retain_mut(|tracked| match tracked.child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    "CLI process {} finished with {status} after {:?}",
                    tracked.child.id(),
                    tracked.started.elapsed()
                );
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Could not poll CLI process {}: {e}", tracked.child.id());
                false
            }
        });
        before - children.len()
    }

    /// Number of children still running, as of the last reap.
    pub fn active(&self) -> usize {
        self.lock().len()
    }

    /// Wait up to `timeout` for every child to exit. Returns true if none remain.
    pub fn wait_all(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.reap();
            if self.active() == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(WAIT_POLL_INTERVAL);
        }
    }

    /// Kill every child still running. Returns how many were signalled.
    pub fn terminate_all(&self) -> usize {
        let mut children = self.lock();
        let mut killed = 0;
        for tracked in children.iter_mut() {
            match tracked.child.kill() {
                Ok(()) => {
                    let _ = tracked.child.wait();
                    killed += 1;
                }
                Err(e) => warn!("Could not kill CLI process {}: {e}", tracked.child.id()),
            }
        }
        children.clear();
        killed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TrackedChild>> {
        self.children.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ProcessRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRegistry")
            .field("active", &self.active())
            .finish()
    }
}
