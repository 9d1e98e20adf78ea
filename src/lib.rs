//! Install a single-binary release archive on first use, then run it.
//!
//! ```no_run
//! use insbin::{Installer, platform_tag};
//!
//! fn main() -> insbin::Result<()> {
//!     let url = format!(
//!         "https://github.com/wuriyanto48/yowes/releases/download/v1.0.0/yowes-v1.0.0.{}.tar.gz",
//!         platform_tag()?
//!     );
//!     let mut installer = Installer::install_to_home("yowes", &url, None)?;
//!     let result = installer.run(std::env::args_os().skip(1))?;
//!     std::process::exit(result.exit_code);
//! }
//! ```

pub mod config;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod installer;
pub mod layout;
pub mod platform;
pub mod progress;
pub mod runner;

pub use config::{
    default_install_root, expand_source, render_source, BufferStrategy, InstallerConfig, Manifest,
};
pub use errors::{InsbinError, Result};
pub use installer::{InstallStatus, Installer};
pub use platform::{platform_tag, PlatformTag};
pub use progress::{ProgressReporter, SilentReporter, SpinnerReporter};
pub use runner::ProcessResult;
