use crate::cli::AppArgs;
use crate::command_handlers::build_installer;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;

pub fn run_app(app: &AppArgs, args: &[OsString], manifest_path: &Path, quiet: bool) -> Result<i32> {
    let mut installer = build_installer(app, manifest_path, quiet)?;
    let result = installer
        .run(args)
        .with_context(|| format!("running {}", app.name))?;
    Ok(result.exit_code)
}
