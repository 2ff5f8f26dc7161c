//! Unbounded FIFO of accepted heartbeats.

use crate::heartbeat::types::Heartbeat;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// One drain of the queue: the oldest pending heartbeat plus everything behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub primary: Heartbeat,
    pub extra: Vec<Heartbeat>,
}

impl Batch {
    /// Total number of heartbeats in the batch.
    pub fn count(&self) -> usize {
        1 + self.extra.len()
    }
}

/// Multi-producer, single-consumer heartbeat queue.
///
/// Cloning shares the same underlying queue. Insertion order is dispatch order.
#[derive(Debug, Clone)]
pub struct HeartbeatQueue {
    sender: Sender<Heartbeat>,
    receiver: Receiver<Heartbeat>,
}

impl HeartbeatQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn push(&self, heartbeat: Heartbeat) {
        // Both ends live in `self`, so the channel can never be disconnected here.
        let _ = self.sender.send(heartbeat);
    }

    /// Pop the oldest heartbeat and everything queued behind it.
    ///
    /// Returns `None` when the queue is empty.
    pub fn drain_batch(&self) -> Option<Batch> {
        let primary = self.receiver.try_recv().ok()?;
        let extra: Vec<Heartbeat> = self.receiver.try_iter().collect();
        Some(Batch { primary, extra })
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for HeartbeatQueue {
    fn default() -> Self {
        Self::new()
    }
}
