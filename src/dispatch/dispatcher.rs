//! Spawning `wakatime-cli` for a batch.

use crate::config::{read_api_key, ConfigFile};
use crate::dispatch::command::{obfuscated_args, CliCommand};
use crate::dispatch::registry::ProcessRegistry;
use crate::heartbeat::Heartbeat;
use crate::stats::{create_shared_stats, SharedActivityStats};
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Anything that can take a drained batch off the scheduler's hands.
pub trait Dispatch: Send + Sync {
    /// Deliver one batch. Failures are handled inside; the batch is never returned.
    fn send(&self, primary: Heartbeat, extra: Vec<Heartbeat>);

    /// Housekeeping between ticks.
    fn reap(&self) {}

    /// Give background work up to `timeout` to finish, then stop it.
    fn finish(&self, _timeout: Duration) {}
}

/// Dispatch errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize extra heartbeats: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write extra heartbeats to the CLI: {0}")]
    Stdin(#[source] std::io::Error),
    #[error("failed waiting for the CLI: {0}")]
    Wait(#[source] std::io::Error),
}

/// What happened to a successfully spawned CLI process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Left running in the background
    Spawned { pid: u32 },
    /// Waited for (debug mode)
    Completed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

/// Runs one CLI process per batch.
pub struct Dispatcher {
    command: CliCommand,
    config: ConfigFile,
    debug: bool,
    registry: ProcessRegistry,
    stats: SharedActivityStats,
}

impl Dispatcher {
    /// `config` is consulted for the API key on every send.
    pub fn new(command: CliCommand, config: ConfigFile, debug: bool) -> Self {
        Self {
            command,
            config,
            debug,
            registry: ProcessRegistry::new(),
            stats: create_shared_stats(),
        }
    }

    pub fn with_stats(mut self, stats: SharedActivityStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn command(&self) -> &CliCommand {
        &self.command
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Spawn the CLI for one batch.
    ///
    /// In debug mode this blocks until the CLI exits and logs its output;
    /// otherwise the child is tracked and left running.
    pub fn try_send(
        &self,
        primary: &Heartbeat,
        extra: &[Heartbeat],
    ) -> Result<DispatchOutcome, DispatchError> {
        let api_key = read_api_key(&self.config);
        let args = self.command.args(primary, !extra.is_empty(), &api_key);
        debug!("Executing CLI: {:?}", obfuscated_args(&args));

        let (program, rest) = args.split_first().ok_or_else(|| DispatchError::Spawn {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        let output = || {
            if self.debug {
                Stdio::piped()
            } else {
                Stdio::null()
            }
        };
        let mut child = Command::new(program)
            .args(rest)
            .stdin(if extra.is_empty() {
                Stdio::null()
            } else {
                Stdio::piped()
            })
            .stdout(output())
            .stderr(output())
            .spawn()
            .map_err(|source| DispatchError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();

        if !self.debug {
            let written = stdin.map_or(Ok(()), |stdin| write_extra(stdin, extra));
            let pid = child.id();
            self.registry.track(child);
            written?;
            return Ok(DispatchOutcome::Spawned { pid });
        }

        // Feed stdin while draining stdout and stderr, so a CLI that talks
        // before it reads cannot fill both pipes.
        let (result, written) = std::thread::scope(|scope| {
            let writer = stdin.map(|stdin| scope.spawn(move || write_extra(stdin, extra)));
            let result = child.wait_with_output();
            let written = match writer {
                Some(handle) => handle.join().unwrap_or_else(|_| {
                    Err(DispatchError::Stdin(std::io::Error::other(
                        "stdin writer panicked",
                    )))
                }),
                None => Ok(()),
            };
            (result, written)
        });
        let result = result.map_err(DispatchError::Wait)?;
        written?;

        let stdout = String::from_utf8_lossy(&result.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&result.stderr).into_owned();
        for line in stdout.lines().chain(stderr.lines()) {
            debug!("{line}");
        }
        debug!("Command finished with return value: {:?}", result.status.code());

        Ok(DispatchOutcome::Completed {
            exit_code: result.status.code(),
            stdout,
            stderr,
        })
    }
}

/// Write the extra heartbeats as one JSON array line, then close the pipe.
fn write_extra(
    mut stdin: std::process::ChildStdin,
    extra: &[Heartbeat],
) -> Result<(), DispatchError> {
    let json = serde_json::to_string(extra)?;
    debug!("{json}");
    stdin
        .write_all(json.as_bytes())
        .and_then(|()| stdin.write_all(b"\n"))
        .and_then(|()| stdin.flush())
        .map_err(DispatchError::Stdin)
}

impl Dispatch for Dispatcher {
    fn send(&self, primary: Heartbeat, extra: Vec<Heartbeat>) {
        match self.try_send(&primary, &extra) {
            Ok(_) => self.stats.record_dispatched(1 + extra.len() as u64),
            Err(e) => {
                warn!("Dropping batch of {} heartbeats: {e}", 1 + extra.len());
                self.stats.record_failed();
            }
        }
    }

    fn reap(&self) {
        self.registry.reap();
    }

    fn finish(&self, timeout: Duration) {
        if self.registry.wait_all(timeout) {
            return;
        }
        let killed = self.registry.terminate_all();
        warn!("Terminated {killed} wakatime-cli processes still running after {timeout:?}");
    }
}
