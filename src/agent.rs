//! Agent lifecycle: startup checks, intake, background dispatch and shutdown.

use crate::config::{is_api_key_valid, ConfigError, ConfigFile, Settings};
use crate::deps::{
    CommandProbe, DependencyError, DependencyResolver, Endpoints, HostPlatform,
};
use crate::dispatch::{CliCommand, Dispatch, Dispatcher};
use crate::download::{DownloadError, DownloadOptions, Downloader};
use crate::heartbeat::{Clock, EventAggregator, HeartbeatQueue, SystemClock};
use crate::scheduler::{drain_and_dispatch, Scheduler};
use crate::stats::{create_shared_stats, SharedActivityStats, StatsSnapshot};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// How long shutdown waits for running CLI processes before killing them.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Agent errors.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(
        "Unable to find python binary. WakaTime requires Python. \
         Install it from https://www.python.org/downloads/ then restart your IDE."
    )]
    InterpreterMissing,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error("failed to start the scheduler thread: {0}")]
    Scheduler(#[source] std::io::Error),
}

/// Startup parameters.
#[derive(Clone)]
pub struct AgentOptions {
    pub config: ConfigFile,
    pub endpoints: Endpoints,
    /// Delay before the first dispatch and between dispatches
    pub interval: Duration,
    pub shutdown_grace: Duration,
    pub clock: Arc<dyn Clock>,
}

impl AgentOptions {
    pub fn new(config: ConfigFile) -> Self {
        Self {
            config,
            endpoints: Endpoints::default(),
            interval: Duration::from_secs(crate::QUEUE_TIMEOUT_SECONDS),
            shutdown_grace: SHUTDOWN_GRACE,
            clock: Arc::new(SystemClock),
        }
    }

    /// Options for the config file at its default location.
    pub fn from_default_config() -> Result<Self, AgentError> {
        Ok(Self::new(ConfigFile::open_default()?))
    }
}

/// Resolver wired to the real host, network and process spawns.
pub fn host_resolver(
    settings: &Settings,
    endpoints: Endpoints,
) -> Result<DependencyResolver, AgentError> {
    let downloader = Downloader::new(&DownloadOptions::from_settings(settings))?;
    Ok(DependencyResolver::new(
        Arc::new(HostPlatform),
        Arc::new(CommandProbe),
        Arc::new(downloader),
    )
    .with_endpoints(endpoints))
}

/// Make sure an interpreter and the CLI are present.
///
/// Installs the interpreter where that is possible and installs or upgrades
/// the CLI. Only a missing interpreter is fatal; a failed CLI install is
/// logged and the returned path may not exist yet.
pub fn prepare_dependencies(
    resolver: &DependencyResolver,
) -> Result<(PathBuf, PathBuf), AgentError> {
    if !resolver.is_interpreter_installed() {
        match resolver.install_interpreter() {
            Ok(true) => info!("Installed embeddable Python"),
            Ok(false) => {}
            Err(e) => warn!("Could not install Python: {e}"),
        }
    }
    let Some(interpreter) = resolver.resolve_interpreter() else {
        error!("{}", AgentError::InterpreterMissing);
        return Err(AgentError::InterpreterMissing);
    };

    if let Err(e) = resolver.ensure_cli() {
        warn!("Could not install wakatime-cli: {e}");
    }

    Ok((interpreter, resolver.cli_path()?))
}

/// A running agent.
pub struct Agent {
    settings: Settings,
    aggregator: EventAggregator,
    dispatcher: Arc<dyn Dispatch>,
    scheduler: Scheduler,
    shutdown_grace: Duration,
}

impl Agent {
    /// Load settings, set up logging and dependencies, then start dispatching.
    pub fn start(options: AgentOptions) -> Result<Self, AgentError> {
        let settings = Settings::load(&options.config);
        crate::logging::init(settings.debug);
        info!("Initializing WakaTime plugin v{}", crate::VERSION);

        let resolver = host_resolver(&settings, options.endpoints.clone())?;
        Self::start_with_resolver(options, settings, &resolver)
    }

    /// Startup with an already-built resolver.
    pub fn start_with_resolver(
        options: AgentOptions,
        settings: Settings,
        resolver: &DependencyResolver,
    ) -> Result<Self, AgentError> {
        if !is_api_key_valid(settings.api_key_or_empty()) {
            warn!(
                "No valid api_key in {}; set one with `wakatime-agent api-key <KEY>`",
                options.config.path().display()
            );
        }

        let (interpreter, cli_path) = prepare_dependencies(resolver)?;

        if settings.debug {
            warn!("Running WakaTime in DEBUG mode. Your IDE may be slow when saving or editing files.");
        }

        let stats = create_shared_stats();
        let dispatcher = Dispatcher::new(
            CliCommand::new(interpreter, cli_path),
            options.config.clone(),
            settings.debug,
        )
        .with_stats(Arc::clone(&stats));

        let agent = Self::with_dispatcher(options, settings, Arc::new(dispatcher), stats)?;
        info!("Finished initializing WakaTime plugin");
        Ok(agent)
    }

    /// Start intake and scheduling around an existing dispatcher.
    pub fn with_dispatcher(
        options: AgentOptions,
        settings: Settings,
        dispatcher: Arc<dyn Dispatch>,
        stats: SharedActivityStats,
    ) -> Result<Self, AgentError> {
        let queue = HeartbeatQueue::new();
        let aggregator =
            EventAggregator::with_clock(queue.clone(), options.clock).with_stats(stats);
        let scheduler = Scheduler::start(queue, Arc::clone(&dispatcher), options.interval)
            .map_err(AgentError::Scheduler)?;
        debug!("Dispatching every {:?}", options.interval);

        Ok(Self {
            settings,
            aggregator,
            dispatcher,
            scheduler,
            shutdown_grace: options.shutdown_grace,
        })
    }

    /// Record an editor action. Returns whether a heartbeat was queued.
    pub fn append(
        &self,
        project: Option<&str>,
        path: &str,
        extension: &str,
        is_write: bool,
    ) -> bool {
        self.aggregator.append(project, path, extension, is_write)
    }

    /// Dispatch everything queued right now instead of waiting for the next tick.
    pub fn dispatch_pending(&self) -> usize {
        drain_and_dispatch(self.aggregator.queue(), self.dispatcher.as_ref())
    }

    pub fn pending(&self) -> usize {
        self.aggregator.queue().len()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.aggregator.stats().stats()
    }

    /// Stop scheduling, flush the queue and settle running CLI processes.
    pub fn shutdown(mut self) -> StatsSnapshot {
        self.scheduler.shutdown();
        self.dispatcher.finish(self.shutdown_grace);

        let stats = self.aggregator.stats();
        info!("WakaTime agent stopped: {}", stats.summary());
        stats.stats()
    }
}
