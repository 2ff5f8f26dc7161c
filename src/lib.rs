//! WakaTime Agent - editor heartbeat aggregation and dispatch.
//!
//! This library turns editor activity into WakaTime heartbeats, batches them
//! and hands each batch to `wakatime-cli`, keeping the Python interpreter and
//! the CLI it runs on installed and current.
//!
//! # Guarantees
//!
//! - **Every save is recorded**: write actions are never debounced
//! - **No keystroke spam**: edits on the same file are reported at most every 2 minutes
//! - **FIFO delivery**: a batch's primary heartbeat is the oldest one queued
//! - **No leaked keys**: logged command lines never contain the raw API key
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       WakaTime Agent                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │ Aggregator  │──▶│    Queue    │──▶│  Scheduler  │       │
//! │  │ (debounce)  │   │   (FIFO)    │   │ (30s ticks) │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                                             │               │
//! │                                             ▼               │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │  Resolver   │────────────────────▶│ Dispatcher  │       │
//! │  │ (python+cli)│                     │(wakatime-cli)│      │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use wakatime_agent::{Agent, AgentOptions};
//!
//! let options = AgentOptions::from_default_config().expect("no home directory");
//! let agent = Agent::start(options).expect("Python is required");
//!
//! agent.append(Some("sketchbook"), "/home/me/sketch/sketch.pde", "pde", false);
//! agent.append(Some("sketchbook"), "/home/me/sketch/sketch.pde", "pde", true);
//!
//! let stats = agent.shutdown();
//! println!("{} heartbeats sent", stats.heartbeats_dispatched);
//! ```

pub mod agent;
pub mod archive;
pub mod config;
pub mod deps;
pub mod dispatch;
pub mod download;
pub mod heartbeat;
pub mod logging;
pub mod scheduler;
pub mod stats;

// Re-export key types at crate root for convenience
pub use agent::{Agent, AgentError, AgentOptions};
pub use config::{ConfigError, ConfigFile, Settings};
pub use deps::{CliStatus, DependencyError, DependencyResolver, Endpoints, RemoteVersion};
pub use dispatch::{CliCommand, Dispatch, DispatchError, Dispatcher};
pub use download::{DownloadError, Downloader, Fetcher};
pub use heartbeat::{Batch, EventAggregator, Heartbeat, HeartbeatQueue, Language};
pub use scheduler::Scheduler;
pub use stats::{ActivityStats, SharedActivityStats, StatsSnapshot};

/// Library version, reported to WakaTime as the plugin version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seconds before activity on an unchanged file is reported again.
pub const FREQUENCY: u64 = 120;

/// Seconds between queue drains, and before the first one.
pub const QUEUE_TIMEOUT_SECONDS: u64 = 30;

/// Editor name sent in `--plugin`.
pub const IDE_NAME: &str = "Processing";

/// Plugin identifier sent in `--plugin`.
pub const PLUGIN_ID: &str = "processing-wakatime";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_window_is_longer_than_tick() {
        assert!(FREQUENCY > QUEUE_TIMEOUT_SECONDS);
    }
}
