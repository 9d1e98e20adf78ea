use crate::cli::AppArgs;
use crate::command_handlers::build_installer;
use anyhow::Result;
use std::path::Path;

pub fn print_status(app: &AppArgs, manifest_path: &Path) -> Result<()> {
    let installer = build_installer(app, manifest_path, true)?;
    let status = installer.status();
    println!("{} source={}", app.name, installer.config().source_url());
    println!("  installed={}", status.installed);
    println!("  binary={}", status.binary_path.display());
    println!(
        "  exists={} executable={}",
        status.binary_exists, status.executable
    );
    Ok(())
}
