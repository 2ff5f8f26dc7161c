//! WakaTime Agent CLI
//!
//! Feeds editor activity to `wakatime-cli` and manages its dependencies.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossbeam_channel::{bounded, select, unbounded};
use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use wakatime_agent::{
    agent::{host_resolver, prepare_dependencies},
    config::{is_api_key_valid, obfuscate_key, read_api_key, SETTINGS_SECTION},
    deps::CliStatus,
    dispatch::DispatchOutcome,
    logging, Agent, AgentOptions, CliCommand, ConfigFile, Dispatch, Dispatcher, Endpoints,
    Heartbeat, Language, Settings, QUEUE_TIMEOUT_SECONDS, VERSION,
};

#[derive(Parser)]
#[command(name = "wakatime-agent")]
#[command(author = "WakaTime")]
#[command(version = VERSION)]
#[command(about = "Editor heartbeat agent for WakaTime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent, reading editor actions as JSON lines from stdin
    Run,

    /// Send a single heartbeat right away
    Heartbeat {
        /// File the heartbeat is about
        #[arg(long)]
        entity: String,

        /// Project name
        #[arg(long)]
        project: Option<String>,

        /// Editor mode extension used to pick the language (defaults to the entity's)
        #[arg(long)]
        extension: Option<String>,

        /// The file was saved
        #[arg(long)]
        write: bool,
    },

    /// Install or upgrade Python and wakatime-cli
    Deps,

    /// Show the stored API key, or store a new one
    ApiKey {
        /// New API key (a UUID)
        key: Option<String>,
    },

    /// Show configuration
    Config,
}

/// One editor action on stdin.
#[derive(Debug, Deserialize)]
struct EditorAction {
    #[serde(default)]
    project: Option<String>,
    path: String,
    #[serde(default)]
    extension: String,
    #[serde(default)]
    is_write: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigFile::open_default()?;

    match cli.command {
        Commands::Run => cmd_run(config),
        Commands::Heartbeat {
            entity,
            project,
            extension,
            write,
        } => cmd_heartbeat(config, &entity, project, extension, write),
        Commands::Deps => cmd_deps(config),
        Commands::ApiKey { key } => cmd_api_key(config, key),
        Commands::Config => cmd_config(config),
    }
}

fn cmd_run(config: ConfigFile) -> Result<()> {
    let agent = Agent::start(AgentOptions::new(config))?;

    let (stop_tx, stop_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .context("Error setting Ctrl+C handler")?;

    // Stdin is read on its own thread so Ctrl+C is seen while a read blocks.
    let (action_tx, action_rx) = unbounded::<String>();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if action_tx.send(line).is_err() {
                    break;
                }
            }
        })?;

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(action_rx) -> line => {
                let Ok(line) = line else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<EditorAction>(line) {
                    Ok(action) => {
                        let queued = agent.append(
                            action.project.as_deref(),
                            &action.path,
                            &action.extension,
                            action.is_write,
                        );
                        debug!("{} -> queued: {queued}", action.path);
                    }
                    Err(e) => warn!("Ignoring malformed action {line:?}: {e}"),
                }
            }
        }
    }

    let stats = agent.shutdown();
    println!(
        "Sent {} heartbeats in {} batches ({} debounced, {} batches failed)",
        stats.heartbeats_dispatched,
        stats.batches_dispatched,
        stats.heartbeats_debounced,
        stats.batches_failed
    );
    Ok(())
}

fn cmd_heartbeat(
    config: ConfigFile,
    entity: &str,
    project: Option<String>,
    extension: Option<String>,
    write: bool,
) -> Result<()> {
    let settings = Settings::load(&config);
    logging::init(settings.debug);

    let resolver = host_resolver(&settings, Endpoints::default())?;
    let (interpreter, cli_path) = prepare_dependencies(&resolver)?;
    let dispatcher = Dispatcher::new(
        CliCommand::new(interpreter, cli_path),
        config,
        settings.debug,
    );

    let extension = extension.unwrap_or_else(|| {
        Path::new(entity)
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let heartbeat = Heartbeat::new(
        entity,
        Utc::now(),
        write,
        project,
        Some(Language::from_extension(&extension)),
    );

    match dispatcher.try_send(&heartbeat, &[])? {
        DispatchOutcome::Spawned { pid } => println!("wakatime-cli started (pid {pid})"),
        DispatchOutcome::Completed {
            exit_code,
            stdout,
            stderr,
        } => {
            print!("{stdout}");
            eprint!("{stderr}");
            println!("wakatime-cli exited with {exit_code:?}");
        }
    }

    dispatcher.finish(Duration::from_secs(QUEUE_TIMEOUT_SECONDS));
    Ok(())
}

fn cmd_deps(config: ConfigFile) -> Result<()> {
    let settings = Settings::load(&config);
    logging::init(settings.debug);

    let resolver = host_resolver(&settings, Endpoints::default())?;
    println!("Resources directory: {}", resolver.resources_dir()?.display());

    if !resolver.is_interpreter_installed() && resolver.install_interpreter()? {
        println!("Installed embeddable Python");
    }
    let Some(interpreter) = resolver.resolve_interpreter() else {
        bail!(wakatime_agent::AgentError::InterpreterMissing);
    };
    println!("Python: {}", interpreter.display());

    let status = resolver.ensure_cli()?;
    let verb = match status {
        CliStatus::Installed => "installed",
        CliStatus::Upgraded => "upgraded",
        CliStatus::UpToDate => "up to date",
    };
    println!("wakatime-cli {verb}: {}", resolver.cli_path()?.display());
    Ok(())
}

fn cmd_api_key(config: ConfigFile, key: Option<String>) -> Result<()> {
    let Some(key) = key else {
        let current = read_api_key(&config);
        if current.is_empty() {
            println!("No API key set in {}", config.path().display());
        } else {
            let validity = if is_api_key_valid(&current) { "" } else { " (invalid)" };
            println!("API key: {}{validity}", obfuscate_key(&current));
        }
        return Ok(());
    };

    let key = key.trim();
    if !is_api_key_valid(key) {
        bail!("{key:?} is not a valid API key; expected a UUID like 00000000-0000-0000-0000-000000000000");
    }
    config.set(SETTINGS_SECTION, "api_key", key)?;
    println!("API key saved to {}", config.path().display());
    Ok(())
}

fn cmd_config(config: ConfigFile) -> Result<()> {
    let settings = Settings::load(&config);
    let resolver = host_resolver(&settings, Endpoints::default())?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {}", config.path().display());
    match resolver.resources_dir() {
        Ok(dir) => println!("Resources directory: {}", dir.display()),
        Err(e) => println!("Resources directory: unavailable ({e})"),
    }
    match resolver.cli_path() {
        Ok(path) if path.exists() => println!("wakatime-cli: {}", path.display()),
        Ok(path) => println!("wakatime-cli: {} (not installed)", path.display()),
        Err(_) => {}
    }
    println!();
    println!(
        "  api_key: {}",
        settings
            .api_key
            .as_deref()
            .map(obfuscate_key)
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  debug: {}", settings.debug);
    println!(
        "  proxy: {}",
        settings.proxy.as_deref().unwrap_or("(not set)")
    );
    println!("  no_ssl_verify: {}", settings.no_ssl_verify);
    Ok(())
}
