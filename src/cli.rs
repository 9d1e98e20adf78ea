use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    name = "insbin",
    about = "insbin: install a release archive on first use and run the binary inside it"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to manifest (defaults to ./insbin.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Hide the download spinner
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AppArgs {
    /// Application name; also the binary name inside the archive
    #[arg(value_name = "APP")]
    pub name: String,
    /// Archive URL. Supports {platform}, {os}, {arch}. Looked up in the manifest when omitted.
    #[arg(long)]
    pub url: Option<String>,
    /// Installation directory (defaults to ~/.<APP>)
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Expected SHA-256 of the archive
    #[arg(long)]
    pub sha256: Option<String>,
    /// Buffer the download in a temp file instead of memory
    #[arg(long)]
    pub temp_file: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and extract the application unless already installed
    Install {
        #[command(flatten)]
        app: AppArgs,
    },
    /// Run the application, installing it first if needed.
    /// Examples:
    ///   insbin run yowes -- --help
    ///   insbin run yowes --url https://example.com/yowes.{platform}.tar.gz -- serve
    Run {
        #[command(flatten)]
        app: AppArgs,
        /// Arguments passed to the application verbatim
        #[arg(last = true, value_name = "ARGS")]
        args: Vec<OsString>,
    },
    /// Show installation state without touching the network
    Status {
        #[command(flatten)]
        app: AppArgs,
    },
    /// Print the platform tag used in release archive names
    Platform,
}
