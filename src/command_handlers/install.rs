use crate::cli::AppArgs;
use crate::command_handlers::build_installer;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run_install(app: &AppArgs, manifest_path: &Path, quiet: bool) -> Result<()> {
    let mut installer = build_installer(app, manifest_path, quiet)?;
    if installer.is_installed() {
        println!(
            "{} already installed in {} (skipping)",
            app.name,
            installer.layout().root().display()
        );
        return Ok(());
    }
    installer
        .install()
        .with_context(|| format!("installing {}", app.name))?;
    println!("Installed {} into {}", app.name, installer.layout().root().display());
    Ok(())
}
