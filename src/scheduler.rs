//! Periodic drain-and-dispatch of the heartbeat queue.

use crate::dispatch::Dispatch;
use crate::heartbeat::HeartbeatQueue;
use crossbeam_channel::{bounded, select, tick, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

/// Pop everything queued and hand it to `dispatcher` as one batch.
///
/// Returns the number of heartbeats dispatched; zero means the queue was empty.
pub fn drain_and_dispatch(queue: &HeartbeatQueue, dispatcher: &dyn Dispatch) -> usize {
    match queue.drain_batch() {
        Some(batch) => {
            let count = batch.count();
            debug!("Dispatching {count} heartbeats");
            dispatcher.send(batch.primary, batch.extra);
            count
        }
        None => 0,
    }
}

/// Background worker that drains the queue every `interval`.
///
/// The first tick fires one `interval` after start. Ticks run on a single
/// thread, so a slow dispatch delays the next tick instead of overlapping it.
pub struct Scheduler {
    queue: HeartbeatQueue,
    dispatcher: Arc<dyn Dispatch>,
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn start(
        queue: HeartbeatQueue,
        dispatcher: Arc<dyn Dispatch>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let worker_queue = queue.clone();
        let worker_dispatcher = Arc::clone(&dispatcher);

        let handle = std::thread::Builder::new()
            .name("wakatime-scheduler".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(shutdown_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            worker_dispatcher.reap();
                            drain_and_dispatch(&worker_queue, worker_dispatcher.as_ref());
                        }
                    }
                }
                debug!("Scheduler stopped");
            })?;

        Ok(Self {
            queue,
            dispatcher,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Stop the worker and dispatch whatever is still queued.
    pub fn shutdown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Scheduler thread panicked");
            }
        }
        drain_and_dispatch(&self.queue, self.dispatcher.as_ref());
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if self.is_running() {
            self.shutdown();
        }
    }
}
