//! Latest published CLI version.

use regex::Regex;
use std::sync::OnceLock;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"__version_info__ = \('([0-9]+)', '([0-9]+)', '([0-9]+)'\)")
            .expect("version pattern is valid")
    })
}

/// Version parsed from the remote `__about__.py`, or `Unknown` if that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteVersion {
    Known(String),
    Unknown,
}

impl RemoteVersion {
    /// Extract `major.minor.patch` from the `__version_info__` tuple in `text`.
    pub fn parse(text: &str) -> Self {
        match version_pattern().captures(text) {
            Some(caps) => RemoteVersion::Known(format!("{}.{}.{}", &caps[1], &caps[2], &caps[3])),
            None => RemoteVersion::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RemoteVersion::Known(version) => version,
            RemoteVersion::Unknown => "Unknown",
        }
    }

    /// Whether a local `--version` output names this version.
    pub fn is_reported_by(&self, output: &str) -> bool {
        output.contains(self.as_str())
    }
}

impl std::fmt::Display for RemoteVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
