//! Running candidate executables to see whether they work.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Result of running a program to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Whether the process exited with status 0
    pub success: bool,
    /// Stdout followed by stderr
    pub output: String,
}

/// Runs a program and reports how it exited. Returns `None` if it could not start.
pub trait Probe: Send + Sync {
    fn run(&self, program: &Path, args: &[&OsStr]) -> Option<ProbeOutput>;
}

/// Probe backed by real process spawns.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandProbe;

impl Probe for CommandProbe {
    fn run(&self, program: &Path, args: &[&OsStr]) -> Option<ProbeOutput> {
        debug!("{} {:?}", program.display(), args);
        let result = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output();

        match result {
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                if !text.trim().is_empty() {
                    debug!("{}", text.trim());
                }
                Some(ProbeOutput {
                    success: output.status.success(),
                    output: text,
                })
            }
            Err(e) => {
                debug!("{}: {e}", program.display());
                None
            }
        }
    }
}
