//! Heartbeat value types.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Languages the editor can report, keyed by its mode's default extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Language {
    Java,
    Python,
    JavaScript,
    CoffeeScript,
    Unknown,
}

impl Language {
    /// Map an editor mode's default file extension to a language.
    ///
    /// Total: anything unrecognized is `Unknown`.
    pub fn from_extension(extension: &str) -> Self {
        match extension.trim_start_matches('.') {
            "pde" | "java" => Language::Java,
            "pyde" => Language::Python,
            "js" => Language::JavaScript,
            "coffee" => Language::CoffeeScript,
            _ => Language::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "Java",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::CoffeeScript => "CoffeeScript",
            Language::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded coding-activity event.
///
/// Serializes to the shape `wakatime-cli` expects on `--extra-heartbeats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heartbeat {
    /// Absolute path of the file that was touched
    pub entity: String,
    /// When the action was accepted, sent as fractional unix seconds
    #[serde(rename = "timestamp", serialize_with = "serialize_unix_seconds")]
    pub time: DateTime<Utc>,
    /// Whether the action was a save
    pub is_write: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl Heartbeat {
    pub fn new(
        entity: impl Into<String>,
        time: DateTime<Utc>,
        is_write: bool,
        project: Option<String>,
        language: Option<Language>,
    ) -> Self {
        Self {
            entity: entity.into(),
            time,
            is_write,
            project,
            language,
        }
    }

    /// Seconds since the epoch with millisecond precision.
    pub fn unix_seconds(&self) -> f64 {
        self.time.timestamp_millis() as f64 / 1000.0
    }

    /// The `--time` argument value.
    pub fn time_arg(&self) -> String {
        format!("{:.3}", self.unix_seconds())
    }
}

/// Timestamps go out as fractional unix seconds.
fn serialize_unix_seconds<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(time.timestamp_millis() as f64 / 1000.0)
}
