//! Interpreter discovery and CLI install/upgrade.

use crate::archive::{self, ArchiveError};
use crate::config::HOME_ENV;
use crate::deps::platform::Platform;
use crate::deps::probe::Probe;
use crate::deps::version::RemoteVersion;
use crate::download::{DownloadError, Fetcher};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Executable names tried for every candidate directory, in order.
const INTERPRETER_NAMES: [&str; 3] = ["pythonw", "python3", "python"];

/// Directories searched right after `$PATH`, before any platform-specific ones.
const UNIX_PREFIXES: [&str; 3] = ["/", "/usr/local/bin/", "/usr/bin/"];

/// Top-level directory the CLI archive expands to.
const CLI_INSTALL_DIR: &str = "wakatime-master";
const CLI_ARCHIVE_NAME: &str = "wakatime-cli.zip";
const PYTHON_DIR: &str = "python";
const PYTHON_ARCHIVE_NAME: &str = "python.zip";

/// Remote locations of everything the resolver downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub cli_archive_url: String,
    pub cli_version_url: String,
    pub python_version: String,
    /// Interpreter archive URL with `{version}` and `{arch}` placeholders
    pub python_url_template: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            cli_archive_url: "https://codeload.github.com/wakatime/wakatime/zip/master".to_string(),
            cli_version_url:
                "https://raw.githubusercontent.com/wakatime/wakatime/master/wakatime/__about__.py"
                    .to_string(),
            python_version: "3.5.2".to_string(),
            python_url_template:
                "https://www.python.org/ftp/python/{version}/python-{version}-embed-{arch}.zip"
                    .to_string(),
        }
    }
}

impl Endpoints {
    /// Embeddable interpreter archive for a 64- or 32-bit host.
    pub fn python_url(&self, is_64bit: bool) -> String {
        let arch = if is_64bit { "amd64" } else { "win32" };
        self.python_url_template
            .replace("{version}", &self.python_version)
            .replace("{arch}", arch)
    }
}

/// Dependency errors.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("could not determine a resources directory (no home directory)")]
    NoResourcesDir,
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// What [`DependencyResolver::ensure_cli`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliStatus {
    Installed,
    Upgraded,
    UpToDate,
}

/// Ordered interpreter executables to probe.
///
/// Each candidate directory contributes `pythonw`, `python3` and `python`, in
/// that order. On Windows the bundled install, registry installs and
/// `\PythonNN` directories (50 down to 27) follow the common prefixes.
pub fn interpreter_candidates(
    platform: &dyn Platform,
    resources_dir: Option<&Path>,
) -> Vec<PathBuf> {
    let mut prefixes: Vec<Option<PathBuf>> = vec![None];
    prefixes.extend(UNIX_PREFIXES.iter().map(|p| Some(PathBuf::from(p))));

    if platform.is_windows() {
        if let Some(resources) = resources_dir {
            prefixes.push(Some(resources.join(PYTHON_DIR)));
        }
        prefixes.extend(platform.registry_install_paths().into_iter().map(Some));
        for version in (27..=50).rev() {
            prefixes.push(Some(PathBuf::from(format!(r"\python{version}"))));
            prefixes.push(Some(PathBuf::from(format!(r"\Python{version}"))));
        }
    }

    prefixes
        .iter()
        .flat_map(|prefix| {
            INTERPRETER_NAMES.iter().map(move |name| match prefix {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            })
        })
        .collect()
}

/// Locates and installs the interpreter and CLI the dispatcher runs.
///
/// Results are cached on the instance for its lifetime. An interpreter that
/// was not found is not cached, so a later call probes again.
pub struct DependencyResolver {
    platform: Arc<dyn Platform>,
    probe: Arc<dyn Probe>,
    fetcher: Arc<dyn Fetcher>,
    endpoints: Endpoints,
    interpreter: OnceLock<PathBuf>,
    resources_dir: OnceLock<PathBuf>,
}

impl DependencyResolver {
    pub fn new(
        platform: Arc<dyn Platform>,
        probe: Arc<dyn Probe>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            platform,
            probe,
            fetcher,
            endpoints: Endpoints::default(),
            interpreter: OnceLock::new(),
            resources_dir: OnceLock::new(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Probe the candidate list and return the first interpreter that runs.
    pub fn resolve_interpreter(&self) -> Option<PathBuf> {
        if let Some(path) = self.interpreter.get() {
            return Some(path.clone());
        }

        let resources = self.resources_dir().ok();
        let candidates = interpreter_candidates(self.platform.as_ref(), resources.as_deref());
        let version_flag = [OsStr::new("--version")];

        let found = candidates.into_iter().find(|candidate| {
            self.probe
                .run(candidate, &version_flag)
                .is_some_and(|out| out.success)
        });

        match found {
            Some(path) => {
                debug!("Found python binary: {}", path.display());
                Some(self.interpreter.get_or_init(|| path).clone())
            }
            None => {
                warn!("Could not find python binary.");
                None
            }
        }
    }

    pub fn is_interpreter_installed(&self) -> bool {
        self.resolve_interpreter().is_some()
    }

    /// `$WAKATIME_HOME` if it names an existing directory, else the per-user default.
    pub fn resources_dir(&self) -> Result<PathBuf, DependencyError> {
        if let Some(dir) = self.resources_dir.get() {
            return Ok(dir.clone());
        }
        let dir = self.locate_resources_dir()?;
        Ok(self.resources_dir.get_or_init(|| dir).clone())
    }

    fn locate_resources_dir(&self) -> Result<PathBuf, DependencyError> {
        if let Some(home) = self.platform.env(HOME_ENV) {
            let home = home.trim();
            if !home.is_empty() && Path::new(home).is_dir() {
                debug!("Using ${HOME_ENV} for resources folder: {home}");
                return Ok(PathBuf::from(home));
            }
        }

        if self.platform.is_windows() {
            if let Some(app_data) = self.platform.env("APPDATA") {
                return Ok(PathBuf::from(app_data).join("WakaTime"));
            }
        }

        self.platform
            .home_dir()
            .map(|home| home.join(".wakatime"))
            .ok_or(DependencyError::NoResourcesDir)
    }

    /// `<resources>/wakatime-master/wakatime/cli.py`
    pub fn cli_path(&self) -> Result<PathBuf, DependencyError> {
        Ok(self
            .resources_dir()?
            .join(CLI_INSTALL_DIR)
            .join("wakatime")
            .join("cli.py"))
    }

    pub fn is_cli_installed(&self) -> bool {
        self.cli_path().is_ok_and(|path| path.exists())
    }

    /// Fetch the latest published CLI version; `Unknown` on any failure.
    pub fn latest_cli_version(&self) -> RemoteVersion {
        match self.fetcher.fetch_to_string(&self.endpoints.cli_version_url) {
            Ok(text) => {
                let version = RemoteVersion::parse(&text);
                if version == RemoteVersion::Unknown {
                    warn!(
                        "No version found in {}; the CLI will be treated as out of date",
                        self.endpoints.cli_version_url
                    );
                }
                version
            }
            Err(e) => {
                warn!("Could not fetch the latest CLI version: {e}");
                RemoteVersion::Unknown
            }
        }
    }

    /// An installed CLI is stale when its `--version` fails or does not name
    /// the latest published version. A missing CLI is not stale.
    pub fn is_cli_stale(&self) -> bool {
        if !self.is_cli_installed() {
            return false;
        }
        let (Some(interpreter), Ok(cli)) = (self.resolve_interpreter(), self.cli_path()) else {
            return true;
        };

        let Some(result) = self
            .probe
            .run(&interpreter, &[cli.as_os_str(), OsStr::new("--version")])
        else {
            return true;
        };

        debug!("wakatime cli version check output: {:?}", result.output);
        if !result.success {
            return true;
        }

        let latest = self.latest_cli_version();
        debug!("Current cli version from GitHub: {latest}");
        !latest.is_reported_by(&result.output)
    }

    /// Download the CLI archive and replace any previous install with it.
    pub fn install_cli(&self) -> Result<(), DependencyError> {
        let resources = self.resources_dir()?;
        create_dir(&resources)?;

        let archive_path = resources.join(CLI_ARCHIVE_NAME);
        self.download(&self.endpoints.cli_archive_url, &archive_path)?;

        archive::remove_dir_if_exists(&resources.join(CLI_INSTALL_DIR))?;
        let extracted = archive::extract(&archive_path, &resources);
        remove_file(&archive_path);
        extracted?;
        Ok(())
    }

    /// Upgrading is a full reinstall.
    pub fn upgrade_cli(&self) -> Result<(), DependencyError> {
        self.install_cli()
    }

    /// Install the CLI if it is missing, or reinstall it if it is stale.
    pub fn ensure_cli(&self) -> Result<CliStatus, DependencyError> {
        let status = if !self.is_cli_installed() {
            info!("Downloading and installing wakatime-cli...");
            self.install_cli()?;
            info!("Finished downloading and installing wakatime-cli.");
            CliStatus::Installed
        } else if self.is_cli_stale() {
            info!("Upgrading wakatime-cli...");
            self.upgrade_cli()?;
            info!("Finished upgrading wakatime-cli.");
            CliStatus::Upgraded
        } else {
            info!("wakatime-cli is up to date.");
            CliStatus::UpToDate
        };

        debug!("CLI location: {}", self.cli_path()?.display());
        Ok(status)
    }

    /// Install the embeddable interpreter into `<resources>/python`.
    ///
    /// Only Windows has an install path; elsewhere this returns `Ok(false)`.
    pub fn install_interpreter(&self) -> Result<bool, DependencyError> {
        if !self.platform.is_windows() {
            return Ok(false);
        }

        let resources = self.resources_dir()?;
        create_dir(&resources)?;

        let url = self.endpoints.python_url(self.platform.is_64bit());
        let archive_path = resources.join(PYTHON_ARCHIVE_NAME);
        self.download(&url, &archive_path)?;

        let extracted = archive::extract(&archive_path, &resources.join(PYTHON_DIR));
        remove_file(&archive_path);
        extracted?;
        Ok(true)
    }

    /// Fetch `url` to `dest`, leaving nothing behind if the transfer fails.
    fn download(&self, url: &str, dest: &Path) -> Result<(), DependencyError> {
        self.fetcher.download_file(url, dest).map_err(|e| {
            remove_file(dest);
            DependencyError::from(e)
        })
    }
}

fn create_dir(path: &Path) -> Result<(), DependencyError> {
    std::fs::create_dir_all(path).map_err(|source| DependencyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not delete {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::zip_bytes;
    use crate::deps::platform::tests::FakePlatform;
    use crate::deps::probe::ProbeOutput;
    use std::sync::Mutex;
    use tempfile::TempDir;

    type Responder = dyn Fn(&Path, &[&OsStr]) -> Option<ProbeOutput> + Send + Sync;

    struct FakeProbe {
        responder: Box<Responder>,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl FakeProbe {
        fn new(
            responder: impl Fn(&Path, &[&OsStr]) -> Option<ProbeOutput> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                responder: Box::new(responder),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Probe for FakeProbe {
        fn run(&self, program: &Path, args: &[&OsStr]) -> Option<ProbeOutput> {
            self.calls.lock().unwrap().push(program.to_path_buf());
            (self.responder)(program, args)
        }
    }

    fn ok(output: &str) -> Option<ProbeOutput> {
        Some(ProbeOutput {
            success: true,
            output: output.to_string(),
        })
    }

    #[derive(Default)]
    struct FakeFetcher {
        archive: Vec<u8>,
        about: Option<String>,
        /// Write half the archive, then fail
        truncate: bool,
        downloads: Mutex<Vec<String>>,
    }

    impl Fetcher for FakeFetcher {
        fn download_file(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
            self.downloads.lock().unwrap().push(url.to_string());
            let body = if self.truncate {
                &self.archive[..self.archive.len() / 2]
            } else {
                &self.archive[..]
            };
            std::fs::write(dest, body).map_err(|source| DownloadError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
            if self.truncate {
                return Err(DownloadError::Io {
                    path: dest.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
                });
            }
            Ok(())
        }

        fn fetch_to_string(&self, url: &str) -> Result<String, DownloadError> {
            self.about.clone().ok_or_else(|| DownloadError::Io {
                path: PathBuf::from(url),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "offline"),
            })
        }
    }

    fn cli_archive() -> Vec<u8> {
        zip_bytes(&[
            ("wakatime-master/", None),
            ("wakatime-master/wakatime/", None),
            ("wakatime-master/wakatime/cli.py", Some("print('wakatime 1.2.3')")),
        ])
    }

    fn unix_platform(home: &Path) -> FakePlatform {
        FakePlatform {
            arch: "x86_64".to_string(),
            home: Some(home.to_path_buf()),
            ..Default::default()
        }
    }

    fn resolver(
        platform: FakePlatform,
        probe: Arc<FakeProbe>,
        fetcher: Arc<FakeFetcher>,
    ) -> DependencyResolver {
        DependencyResolver::new(Arc::new(platform), probe, fetcher)
    }

    #[test]
    fn test_unix_candidate_order() {
        let platform = unix_platform(Path::new("/home/u"));
        let candidates = interpreter_candidates(&platform, None);

        let expected: Vec<PathBuf> = [
            "pythonw",
            "python3",
            "python",
            "/pythonw",
            "/python3",
            "/python",
            "/usr/local/bin/pythonw",
            "/usr/local/bin/python3",
            "/usr/local/bin/python",
            "/usr/bin/pythonw",
            "/usr/bin/python3",
            "/usr/bin/python",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(candidates, expected);
    }

    #[test]
    fn test_windows_candidates_follow_common_prefixes() {
        let platform = FakePlatform {
            windows: true,
            registry: vec![PathBuf::from(r"C:\Users\u\Python39")],
            ..Default::default()
        };
        let resources = PathBuf::from(r"C:\Users\u\AppData\Roaming\WakaTime");
        let candidates = interpreter_candidates(&platform, Some(&resources));

        // 4 common + bundled + 1 registry + 48 versioned prefixes, 3 names each
        assert_eq!(candidates.len(), (4 + 1 + 1 + 48) * 3);
        assert_eq!(candidates[12], resources.join("python").join("pythonw"));
        assert_eq!(candidates[15], PathBuf::from(r"C:\Users\u\Python39").join("pythonw"));
        assert_eq!(candidates[18], PathBuf::from(r"\python50").join("pythonw"));
        assert_eq!(candidates[21], PathBuf::from(r"\Python50").join("pythonw"));
        assert_eq!(
            candidates.last(),
            Some(&PathBuf::from(r"\Python27").join("python"))
        );
    }

    #[test]
    fn test_first_working_candidate_wins_and_is_cached() {
        let home = TempDir::new().unwrap();
        let probe = FakeProbe::new(|program, _| {
            if program == Path::new("python") {
                ok("Python 3.11.4")
            } else {
                None
            }
        });
        let resolver = resolver(
            unix_platform(home.path()),
            probe.clone(),
            Arc::new(FakeFetcher::default()),
        );

        assert_eq!(resolver.resolve_interpreter(), Some(PathBuf::from("python")));
        assert_eq!(
            probe.calls(),
            vec![
                PathBuf::from("pythonw"),
                PathBuf::from("python3"),
                PathBuf::from("python")
            ]
        );

        assert_eq!(resolver.resolve_interpreter(), Some(PathBuf::from("python")));
        assert_eq!(probe.calls().len(), 3);
    }

    #[test]
    fn test_nonzero_exit_is_not_a_match() {
        let home = TempDir::new().unwrap();
        let probe = FakeProbe::new(|program, _| {
            if program == Path::new("/usr/bin/python3") {
                ok("Python 3.8")
            } else {
                Some(ProbeOutput {
                    success: false,
                    output: String::new(),
                })
            }
        });
        let resolver = resolver(
            unix_platform(home.path()),
            probe.clone(),
            Arc::new(FakeFetcher::default()),
        );

        assert_eq!(
            resolver.resolve_interpreter(),
            Some(PathBuf::from("/usr/bin/python3"))
        );
        assert_eq!(probe.calls().len(), 11);
    }

    #[test]
    fn test_missing_interpreter_is_probed_again() {
        let home = TempDir::new().unwrap();
        let probe = FakeProbe::new(|_, _| None);
        let resolver = resolver(
            unix_platform(home.path()),
            probe.clone(),
            Arc::new(FakeFetcher::default()),
        );

        assert!(!resolver.is_interpreter_installed());
        assert_eq!(probe.calls().len(), 12);
        assert_eq!(resolver.resolve_interpreter(), None);
        assert_eq!(probe.calls().len(), 24);
    }

    #[test]
    fn test_resources_dir_prefers_existing_override() {
        let home = TempDir::new().unwrap();
        let custom = TempDir::new().unwrap();
        let mut platform = unix_platform(home.path());
        platform.env.insert(
            HOME_ENV.to_string(),
            format!("  {}  ", custom.path().display()),
        );
        let resolver = resolver(
            platform,
            FakeProbe::new(|_, _| None),
            Arc::new(FakeFetcher::default()),
        );

        assert_eq!(resolver.resources_dir().unwrap(), custom.path());
    }

    #[test]
    fn test_resources_dir_ignores_missing_override() {
        let home = TempDir::new().unwrap();
        let mut platform = unix_platform(home.path());
        platform.env.insert(
            HOME_ENV.to_string(),
            home.path().join("nope").display().to_string(),
        );
        let resolver = resolver(
            platform,
            FakeProbe::new(|_, _| None),
            Arc::new(FakeFetcher::default()),
        );

        assert_eq!(
            resolver.resources_dir().unwrap(),
            home.path().join(".wakatime")
        );
        assert_eq!(
            resolver.cli_path().unwrap(),
            home.path()
                .join(".wakatime")
                .join("wakatime-master")
                .join("wakatime")
                .join("cli.py")
        );
    }

    #[test]
    fn test_resources_dir_uses_appdata_on_windows() {
        let mut platform = FakePlatform {
            windows: true,
            ..Default::default()
        };
        platform
            .env
            .insert("APPDATA".to_string(), "/appdata".to_string());
        let resolver = resolver(
            platform,
            FakeProbe::new(|_, _| None),
            Arc::new(FakeFetcher::default()),
        );

        assert_eq!(
            resolver.resources_dir().unwrap(),
            Path::new("/appdata").join("WakaTime")
        );
    }

    #[test]
    fn test_install_is_idempotent_and_cleans_up() {
        let home = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher {
            archive: cli_archive(),
            ..Default::default()
        });
        let resolver = resolver(
            unix_platform(home.path()),
            FakeProbe::new(|_, _| None),
            fetcher.clone(),
        );
        let resources = resolver.resources_dir().unwrap();

        resolver.install_cli().unwrap();
        assert!(resolver.is_cli_installed());
        assert!(!resources.join(CLI_ARCHIVE_NAME).exists());

        let leftover = resources.join(CLI_INSTALL_DIR).join("stale.txt");
        std::fs::write(&leftover, "old").unwrap();

        resolver.install_cli().unwrap();
        assert!(resolver.is_cli_installed());
        assert!(!leftover.exists());
        assert!(!resources.join(CLI_ARCHIVE_NAME).exists());
        assert_eq!(fetcher.downloads.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_extraction_still_removes_archive() {
        let home = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher {
            archive: b"garbage".to_vec(),
            ..Default::default()
        });
        let resolver = resolver(
            unix_platform(home.path()),
            FakeProbe::new(|_, _| None),
            fetcher,
        );

        assert!(matches!(
            resolver.install_cli(),
            Err(DependencyError::Archive(_))
        ));
        let resources = resolver.resources_dir().unwrap();
        assert!(!resources.join(CLI_ARCHIVE_NAME).exists());
        assert!(!resolver.is_cli_installed());
    }

    #[test]
    fn test_interrupted_download_leaves_no_archive() {
        let home = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher {
            archive: cli_archive(),
            truncate: true,
            ..Default::default()
        });
        let resolver = resolver(
            unix_platform(home.path()),
            FakeProbe::new(|_, _| None),
            fetcher,
        );

        assert!(matches!(
            resolver.install_cli(),
            Err(DependencyError::Download(_))
        ));
        let resources = resolver.resources_dir().unwrap();
        assert!(!resources.join(CLI_ARCHIVE_NAME).exists());
        assert!(!resolver.is_cli_installed());
    }

    #[test]
    fn test_interrupted_interpreter_download_leaves_no_archive() {
        let home = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher {
            archive: zip_bytes(&[("python.exe", Some("MZ"))]),
            truncate: true,
            ..Default::default()
        });
        let mut platform = FakePlatform {
            windows: true,
            ..Default::default()
        };
        platform
            .env
            .insert("APPDATA".to_string(), home.path().display().to_string());
        let resolver = resolver(platform, FakeProbe::new(|_, _| None), fetcher);

        assert!(resolver.install_interpreter().is_err());
        let resources = home.path().join("WakaTime");
        assert!(!resources.join(PYTHON_ARCHIVE_NAME).exists());
        assert!(!resources.join(PYTHON_DIR).exists());
    }

    fn installed_resolver(
        home: &TempDir,
        about: Option<&str>,
        cli_output: Option<ProbeOutput>,
    ) -> DependencyResolver {
        let fetcher = Arc::new(FakeFetcher {
            archive: cli_archive(),
            about: about.map(str::to_string),
            ..Default::default()
        });
        let probe = FakeProbe::new(move |program, args| {
            if args.len() == 1 {
                // interpreter discovery
                (program == Path::new("python3")).then(|| ProbeOutput {
                    success: true,
                    output: "Python 3.11".to_string(),
                })
            } else {
                cli_output.clone()
            }
        });
        let resolver = resolver(unix_platform(home.path()), probe, fetcher);
        resolver.install_cli().unwrap();
        resolver
    }

    const ABOUT: &str = "__version_info__ = ('1', '2', '3')";

    #[test]
    fn test_matching_version_is_not_stale() {
        let home = TempDir::new().unwrap();
        let resolver = installed_resolver(&home, Some(ABOUT), ok("1.2.3\n"));
        assert!(!resolver.is_cli_stale());
        assert_eq!(resolver.ensure_cli().unwrap(), CliStatus::UpToDate);
    }

    #[test]
    fn test_other_version_is_stale() {
        let home = TempDir::new().unwrap();
        let resolver = installed_resolver(&home, Some(ABOUT), ok("1.2.2\n"));
        assert!(resolver.is_cli_stale());
        assert_eq!(resolver.ensure_cli().unwrap(), CliStatus::Upgraded);
    }

    #[test]
    fn test_empty_output_is_stale() {
        let home = TempDir::new().unwrap();
        let resolver = installed_resolver(&home, Some(ABOUT), ok(""));
        assert!(resolver.is_cli_stale());
    }

    #[test]
    fn test_failing_version_command_is_stale() {
        let home = TempDir::new().unwrap();
        let failed = Some(ProbeOutput {
            success: false,
            output: "1.2.3".to_string(),
        });
        let resolver = installed_resolver(&home, Some(ABOUT), failed);
        assert!(resolver.is_cli_stale());
    }

    #[test]
    fn test_unknown_remote_version_is_stale() {
        let home = TempDir::new().unwrap();
        let resolver = installed_resolver(&home, None, ok("1.2.3"));
        assert_eq!(resolver.latest_cli_version(), RemoteVersion::Unknown);
        assert!(resolver.is_cli_stale());
    }

    #[test]
    fn test_missing_cli_is_installed_not_stale() {
        let home = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher {
            archive: cli_archive(),
            ..Default::default()
        });
        let resolver = resolver(
            unix_platform(home.path()),
            FakeProbe::new(|_, _| None),
            fetcher,
        );

        assert!(!resolver.is_cli_stale());
        assert_eq!(resolver.ensure_cli().unwrap(), CliStatus::Installed);
        assert!(resolver.is_cli_installed());
    }

    #[test]
    fn test_install_interpreter_is_windows_only() {
        let home = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher {
            archive: zip_bytes(&[("python.exe", Some("MZ")), ("pythonw.exe", Some("MZ"))]),
            ..Default::default()
        });

        let unix = resolver(
            unix_platform(home.path()),
            FakeProbe::new(|_, _| None),
            fetcher.clone(),
        );
        assert!(!unix.install_interpreter().unwrap());
        assert!(fetcher.downloads.lock().unwrap().is_empty());

        let mut platform = FakePlatform {
            windows: true,
            ..Default::default()
        };
        platform.env.insert(
            "APPDATA".to_string(),
            home.path().display().to_string(),
        );
        platform
            .env
            .insert("ProgramFiles(x86)".to_string(), "C:/pf86".to_string());
        let windows = resolver(platform, FakeProbe::new(|_, _| None), fetcher.clone());

        assert!(windows.install_interpreter().unwrap());
        let python_dir = home.path().join("WakaTime").join("python");
        assert!(python_dir.join("pythonw.exe").is_file());
        assert!(!home.path().join("WakaTime").join(PYTHON_ARCHIVE_NAME).exists());
        assert_eq!(
            fetcher.downloads.lock().unwrap().as_slice(),
            ["https://www.python.org/ftp/python/3.5.2/python-3.5.2-embed-amd64.zip"]
        );
    }

    #[test]
    fn test_python_url_by_arch() {
        let endpoints = Endpoints::default();
        assert!(endpoints.python_url(false).ends_with("python-3.5.2-embed-win32.zip"));
        assert!(endpoints.python_url(true).ends_with("python-3.5.2-embed-amd64.zip"));
    }
}
