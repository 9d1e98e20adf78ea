use crate::config::{default_install_root, BufferStrategy, InstallerConfig};
use crate::errors::{InsbinError, Result};
use crate::extract::ArchiveInstaller;
use crate::fetch::{verify_sha256, ArchiveFetcher, ArchiveSink, MemorySink, TempFileSink};
use crate::layout::InstallLayout;
use crate::platform::platform;
use crate::progress::ProgressReporter;
use crate::runner::{ProcessResult, ProcessRunner};
use log::{debug, info};
use once_cell::unsync::OnceCell;
use reqwest::blocking::Client;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Installs an application on first use and runs it.
///
/// The binary directory (`<root>/bin`) existing is the only signal of an
/// installed application. One instance is not meant to be shared between
/// threads; use one instance per concurrent caller.
pub struct Installer {
    config: InstallerConfig,
    layout: InstallLayout,
    fetcher: ArchiveFetcher,
    extractor: ArchiveInstaller,
    runner: ProcessRunner,
    binary_path: OnceCell<PathBuf>,
}

/// Snapshot of an installation, taken without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStatus {
    pub installed: bool,
    pub binary_path: PathBuf,
    pub binary_exists: bool,
    pub executable: bool,
}

impl Installer {
    pub fn new(config: InstallerConfig) -> Self {
        let client = Client::builder()
            .user_agent(concat!("insbin/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        let fetcher = ArchiveFetcher::new(client).with_tick_interval(config.tick_interval());
        Installer {
            layout: InstallLayout::new(config.install_root()),
            config,
            fetcher,
            extractor: ArchiveInstaller::new(),
            runner: ProcessRunner::new(),
            binary_path: OnceCell::new(),
        }
    }

    /// Install under `installation_dir`, or `~/.{app_name}` when none is given.
    pub fn install_to_home(
        app_name: &str,
        url: &str,
        installation_dir: Option<&Path>,
    ) -> Result<Self> {
        let root = match installation_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => default_install_root(app_name)?,
        };
        Ok(Self::new(InstallerConfig::new(url, root, app_name)?))
    }

    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.fetcher = self.fetcher.with_reporter(reporter);
        self
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    pub fn is_installed(&self) -> bool {
        self.layout.is_installed()
    }

    /// Download and extract the archive unless the binary directory exists.
    pub fn install(&mut self) -> Result<()> {
        if self.layout.is_installed() {
            debug!(
                "{} already installed in {}",
                self.config.app_name(),
                self.layout.root().display()
            );
            return Ok(());
        }
        self.binary_path.take();
        info!(
            "installing {} from {}",
            self.config.app_name(),
            self.config.source_url()
        );

        self.layout.ensure_install_root()?;
        let bin_dir = self.layout.binary_directory();
        let entries = match self.config.buffer() {
            BufferStrategy::Memory => self.fetch_and_extract(MemorySink::default(), &bin_dir)?,
            BufferStrategy::TempFile => {
                let sink = TempFileSink::new()
                    .map_err(|e| InsbinError::filesystem(std::env::temp_dir(), e))?;
                self.fetch_and_extract(sink, &bin_dir)?
            }
        };
        info!(
            "installed {} ({entries} entries) into {}",
            self.config.app_name(),
            bin_dir.display()
        );
        Ok(())
    }

    fn fetch_and_extract<S: ArchiveSink>(&self, sink: S, bin_dir: &Path) -> Result<usize> {
        let url = self.config.source_url();
        let download = self.fetcher.fetch_into(url, sink)?;
        if let Some(expected) = self.config.sha256() {
            verify_sha256(url, &download.sha256, expected)?;
        }
        self.extractor.install_into(download.archive, bin_dir)
    }

    /// `<root>/bin/<app>`, installing first when the binary directory is absent.
    pub fn resolve_binary_path(&mut self) -> Result<PathBuf> {
        if let Some(path) = self.binary_path.get() {
            return Ok(path.clone());
        }
        let path = match self.layout.resolve_binary_path(self.config.app_name()) {
            Ok(path) => path,
            Err(InsbinError::NotInstalled { .. }) => {
                self.install()?;
                self.layout.resolve_binary_path(self.config.app_name())?
            }
            Err(e) => return Err(e),
        };
        if !path.exists() {
            return Err(InsbinError::BinaryNotFound {
                name: self.config.app_name().to_string(),
                path,
            });
        }
        let _ = self.binary_path.set(path.clone());
        Ok(path)
    }

    /// Run the application with `args`, relaying its stdout to ours.
    pub fn run<I, S>(&mut self, args: I) -> Result<ProcessResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let path = self.resolve_binary_path()?;
        self.runner.execute(&path, args)
    }

    pub fn run_to<I, S, W>(&mut self, args: I, out: &mut W) -> Result<ProcessResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
        W: Write,
    {
        let path = self.resolve_binary_path()?;
        self.runner.execute_to(&path, args, out)
    }

    pub fn status(&self) -> InstallStatus {
        let binary_path = self.layout.binary_directory().join(self.config.app_name());
        InstallStatus {
            installed: self.layout.is_installed(),
            binary_exists: binary_path.is_file(),
            executable: platform().is_executable(&binary_path),
            binary_path,
        }
    }
}
