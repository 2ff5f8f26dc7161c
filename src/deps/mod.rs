//! Discovery and installation of the Python interpreter and `wakatime-cli`.
//!
//! The resolver probes an ordered list of interpreter candidates, locates the
//! per-user resources directory, and keeps the CLI installed and current by
//! comparing its `--version` output against the latest published version.

pub mod platform;
pub mod probe;
pub mod resolver;
pub mod version;

#[cfg(target_os = "windows")]
mod windows_registry;

// Re-export commonly used types
pub use platform::{HostPlatform, Platform};
pub use probe::{CommandProbe, Probe, ProbeOutput};
pub use resolver::{
    interpreter_candidates, CliStatus, DependencyError, DependencyResolver, Endpoints,
};
pub use version::RemoteVersion;
