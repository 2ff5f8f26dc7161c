//! Heartbeat capture for the WakaTime agent.
//!
//! Editor actions enter through [`EventAggregator::append`], which debounces
//! them and pushes accepted heartbeats onto a [`HeartbeatQueue`] for the
//! scheduler to drain.

pub mod aggregator;
pub mod queue;
pub mod types;

// Re-export commonly used types
pub use aggregator::{Clock, EventAggregator, SystemClock};
pub use queue::{Batch, HeartbeatQueue};
pub use types::{Heartbeat, Language};
