use crate::errors::{InsbinError, Result};
use crate::platform::{platform, PlatformTag};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Where the downloaded archive is held until extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferStrategy {
    #[default]
    Memory,
    TempFile,
}

/// Validated, immutable description of one installable application.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    source_url: Url,
    install_root: PathBuf,
    app_name: String,
    sha256: Option<String>,
    buffer: BufferStrategy,
    tick_interval: Duration,
}

impl InstallerConfig {
    pub fn new(
        source_url: &str,
        install_root: impl Into<PathBuf>,
        app_name: &str,
    ) -> Result<Self> {
        let source_url = parse_source_url(source_url)?;
        let install_root = install_root.into();
        if install_root.as_os_str().is_empty() {
            return Err(InsbinError::invalid_config("installation dir must be set"));
        }
        if app_name.trim().is_empty() {
            return Err(InsbinError::invalid_config("app name must be set"));
        }
        Ok(InstallerConfig {
            source_url,
            install_root,
            app_name: app_name.to_string(),
            sha256: None,
            buffer: BufferStrategy::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        })
    }

    /// Expected hex SHA-256 of the downloaded archive.
    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into().trim().to_ascii_lowercase());
        self
    }

    pub fn with_buffer(mut self, buffer: BufferStrategy) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    pub fn buffer(&self) -> BufferStrategy {
        self.buffer
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

fn parse_source_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InsbinError::invalid_config("source url must be set"));
    }
    let url = Url::parse(raw)
        .map_err(|e| InsbinError::invalid_config(format!("invalid url '{raw}': {e}")))?;
    if url.scheme().is_empty() || url.host_str().map_or(true, str::is_empty) {
        return Err(InsbinError::invalid_config(format!(
            "invalid url '{raw}': scheme and host are required"
        )));
    }
    Ok(url)
}

/// `~/.{app_name}`
pub fn default_install_root(app_name: &str) -> Result<PathBuf> {
    platform()
        .home_dir()
        .map(|home| home.join(format!(".{app_name}")))
        .ok_or_else(|| InsbinError::invalid_config("home directory not found"))
}

/// Expand `{platform}`, `{os}` and `{arch}` placeholders in a source URL template.
pub fn render_source(template: &str, tag: &PlatformTag) -> String {
    template
        .replace("{platform}", &tag.to_string())
        .replace("{os}", tag.os())
        .replace("{arch}", tag.arch())
}

const PLACEHOLDERS: [&str; 3] = ["{platform}", "{os}", "{arch}"];

pub fn has_placeholders(template: &str) -> bool {
    PLACEHOLDERS.iter().any(|p| template.contains(p))
}

/// Render `template` for the running host. The host is only detected when the
/// template has a placeholder, so plain URLs work on any platform.
pub fn expand_source(template: &str) -> Result<String> {
    expand_source_with(template, PlatformTag::detect)
}

pub fn expand_source_with(
    template: &str,
    detect: impl FnOnce() -> Result<PlatformTag>,
) -> Result<String> {
    if !has_placeholders(template) {
        return Ok(template.to_string());
    }
    Ok(render_source(template, &detect()?))
}

/// Apps declared in `insbin.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub apps: BTreeMap<String, AppEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppEntry {
    /// URL template. Supports {platform}, {os}, {arch}
    pub url: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub buffer: Option<BufferStrategy>,
}

impl Manifest {
    /// A missing file is an empty manifest.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Manifest::default());
        }
        let data =
            fs_err::read_to_string(path).map_err(|e| InsbinError::filesystem(path, e))?;
        Self::parse(&data)
            .map_err(|e| InsbinError::invalid_config(format!("{}: {e}", path.display())))
    }

    pub fn parse(data: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(data)
    }

    pub fn get(&self, name: &str) -> Option<&AppEntry> {
        self.apps.get(name)
    }
}

impl AppEntry {
    /// Build a validated config for `name`, rendering the URL for `tag`.
    pub fn to_config(&self, name: &str, tag: &PlatformTag) -> Result<InstallerConfig> {
        self.build(name, &render_source(&self.url, tag))
    }

    /// Like [`to_config`](Self::to_config) for the running host.
    pub fn to_host_config(&self, name: &str) -> Result<InstallerConfig> {
        self.build(name, &expand_source(&self.url)?)
    }

    fn build(&self, name: &str, url: &str) -> Result<InstallerConfig> {
        let root = match &self.dir {
            Some(dir) => dir.clone(),
            None => default_install_root(name)?,
        };
        let mut cfg = InstallerConfig::new(url, root, name)?;
        if let Some(digest) = &self.sha256 {
            cfg = cfg.with_sha256(digest.as_str());
        }
        if let Some(buffer) = self.buffer {
            cfg = cfg.with_buffer(buffer);
        }
        Ok(cfg)
    }
}
