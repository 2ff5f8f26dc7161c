//! Hand-off of heartbeat batches to `wakatime-cli`.
//!
//! Each batch becomes one CLI invocation: the primary heartbeat travels as
//! command-line flags and the extras as a JSON array on the child's stdin.

pub mod command;
pub mod dispatcher;
pub mod registry;

// Re-export commonly used types
pub use command::{obfuscated_args, CliCommand, PluginInfo};
pub use dispatcher::{Dispatch, DispatchError, DispatchOutcome, Dispatcher};
pub use registry::ProcessRegistry;
