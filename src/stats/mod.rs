//! Activity statistics for the WakaTime agent.
//!
//! Counts what the agent accepted, dropped and handed to the CLI so a user
//! can see where their heartbeats went.

pub mod activity;

// Re-export commonly used types
pub use activity::{create_shared_stats, ActivityStats, SharedActivityStats, StatsSnapshot};
