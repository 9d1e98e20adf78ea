use crate::cli::Commands;
use crate::command_handlers::{install, run, status};
use anyhow::Result;
use std::path::Path;

/// Returns the process exit code.
pub fn dispatch(cmd: Commands, manifest_path: &Path, quiet: bool) -> Result<i32> {
    match cmd {
        Commands::Install { app } => install::run_install(&app, manifest_path, quiet).map(|_| 0),
        Commands::Run { app, args } => run::run_app(&app, &args, manifest_path, quiet),
        Commands::Status { app } => status::print_status(&app, manifest_path).map(|_| 0),
        Commands::Platform => {
            println!("{}", insbin::platform_tag()?);
            Ok(0)
        }
    }
}
