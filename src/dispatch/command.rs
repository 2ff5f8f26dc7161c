//! CLI argument construction.

use crate::config::obfuscate_key;
use crate::heartbeat::Heartbeat;
use std::path::PathBuf;

/// Identifies this plugin to the WakaTime API via `--plugin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub ide_name: String,
    pub plugin_id: String,
    pub version: String,
}

impl Default for PluginInfo {
    fn default() -> Self {
        Self {
            ide_name: crate::IDE_NAME.to_string(),
            plugin_id: crate::PLUGIN_ID.to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

impl std::fmt::Display for PluginInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}/{}", self.ide_name, self.plugin_id, self.version)
    }
}

/// How to invoke the CLI: which interpreter runs which script.
#[derive(Debug, Clone)]
pub struct CliCommand {
    pub interpreter: PathBuf,
    pub cli_path: PathBuf,
    pub plugin: PluginInfo,
}

impl CliCommand {
    pub fn new(interpreter: impl Into<PathBuf>, cli_path: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            cli_path: cli_path.into(),
            plugin: PluginInfo::default(),
        }
    }

    pub fn with_plugin(mut self, plugin: PluginInfo) -> Self {
        self.plugin = plugin;
        self
    }

    /// Full argument vector, interpreter first.
    pub fn args(&self, primary: &Heartbeat, has_extra: bool, api_key: &str) -> Vec<String> {
        let mut args = vec![
            self.interpreter.to_string_lossy().into_owned(),
            self.cli_path.to_string_lossy().into_owned(),
            "--entity".to_string(),
            primary.entity.clone(),
            "--time".to_string(),
            primary.time_arg(),
            "--key".to_string(),
            api_key.to_string(),
        ];

        if let Some(project) = &primary.project {
            args.push("--project".to_string());
            args.push(project.clone());
        }

        if let Some(language) = &primary.language {
            args.push("--language".to_string());
            args.push(language.to_string());
        }

        args.push("--plugin".to_string());
        args.push(self.plugin.to_string());

        if primary.is_write {
            args.push("--write".to_string());
        }

        if has_extra {
            args.push("--extra-heartbeats".to_string());
        }

        args
    }
}

/// Copy of `args` safe for logs: the value after every `--key` is masked.
pub fn obfuscated_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut previous = "";
    for arg in args {
        if previous == "--key" {
            out.push(obfuscate_key(arg));
        } else {
            out.push(arg.clone());
        }
        previous = arg.as_str();
    }
    out
}
