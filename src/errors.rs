use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsbinError>;

#[derive(Error, Debug)]
pub enum InsbinError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("filesystem error at {path:?}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    #[error("download failed: {url} returned status {status}")]
    DownloadStatus { url: String, status: u16 },

    #[error("download failed: {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("extracting archive failed: {reason}")]
    Extraction { reason: String },

    /// Binary directory is absent. The facade reacts by installing.
    #[error("not installed: {path:?} does not exist")]
    NotInstalled { path: PathBuf },

    #[error("binary '{name}' not found at {path:?}")]
    BinaryNotFound { name: String, path: PathBuf },

    #[error("failed to launch {path:?}: {source}")]
    ProcessLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("relaying output of {path:?} failed: {source}")]
    ProcessOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InsbinError {
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        InsbinError::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        InsbinError::Filesystem {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn download<S: Into<String>>(url: &url::Url, reason: S) -> Self {
        InsbinError::Download {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn extraction<S: Into<String>>(reason: S) -> Self {
        InsbinError::Extraction {
            reason: reason.into(),
        }
    }
}
