//! Host facts the resolver depends on.

use std::path::PathBuf;

/// Operating-system facts, injectable so discovery can be tested anywhere.
pub trait Platform: Send + Sync {
    fn is_windows(&self) -> bool;

    /// CPU architecture name, as in `std::env::consts::ARCH`.
    fn arch(&self) -> String;

    fn env(&self, key: &str) -> Option<String>;

    fn home_dir(&self) -> Option<PathBuf>;

    /// Python install directories recorded in the Windows registry,
    /// current user first. Empty elsewhere.
    fn registry_install_paths(&self) -> Vec<PathBuf>;

    /// On Windows a 64-bit OS exposes `ProgramFiles(x86)`; elsewhere the arch name decides.
    fn is_64bit(&self) -> bool {
        if self.is_windows() {
            self.env("ProgramFiles(x86)").is_some()
        } else {
            self.arch().contains("64")
        }
    }
}

/// The machine the agent runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn is_windows(&self) -> bool {
        cfg!(target_os = "windows")
    }

    fn arch(&self) -> String {
        std::env::consts::ARCH.to_string()
    }

    fn env(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    #[cfg(target_os = "windows")]
    fn registry_install_paths(&self) -> Vec<PathBuf> {
        super::windows_registry::python_install_paths()
    }

    #[cfg(not(target_os = "windows"))]
    fn registry_install_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}
