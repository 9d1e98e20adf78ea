//! Host platform detection and the small set of OS specific file helpers.

use crate::errors::{InsbinError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

pub fn platform() -> &'static dyn PlatformOps {
    &ConcretePlatform
}

pub trait PlatformOps: Sync + Send {
    fn home_dir(&self) -> Option<PathBuf>;
    fn is_executable(&self, path: &Path) -> bool;
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::UNIX_PLATFORM as ConcretePlatform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WINDOWS_PLATFORM as ConcretePlatform;

/// Canonical `{os}-{arch}` pair used to pick a release archive,
/// e.g. `linux-amd64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTag {
    os: &'static str,
    arch: String,
}

impl PlatformTag {
    /// Detect the tag of the running host.
    pub fn detect() -> Result<Self> {
        let width = if cfg!(target_pointer_width = "64") { 64 } else { 32 };
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH, width)
    }

    /// Only windows, darwin and linux on a 64-bit word size are accepted.
    pub fn from_parts(os: &str, arch: &str, pointer_width: u32) -> Result<Self> {
        let unsupported = || InsbinError::UnsupportedPlatform {
            os: os.to_string(),
            arch: format!("{arch} ({pointer_width}-bit)"),
        };
        let os = match os {
            "windows" => "windows",
            "macos" | "darwin" => "darwin",
            "linux" => "linux",
            _ => return Err(unsupported()),
        };
        if pointer_width != 64 {
            return Err(unsupported());
        }
        let arch = match arch {
            "x86_64" | "amd64" => "amd64",
            "aarch64" | "arm64" => "arm64",
            // 32-bit names reported alongside a 64-bit width are still rejected
            "x86" | "i386" | "i686" | "arm" => return Err(unsupported()),
            other => other,
        };
        Ok(PlatformTag {
            os,
            arch: arch.to_string(),
        })
    }

    pub fn os(&self) -> &str {
        self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// The host tag as a string, for templating into release URLs.
pub fn platform_tag() -> Result<String> {
    PlatformTag::detect().map(|t| t.to_string())
}
