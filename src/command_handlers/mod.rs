pub mod dispatch;
pub mod install;
pub mod run;
pub mod status;

use crate::cli::AppArgs;
use anyhow::{anyhow, Context, Result};
use insbin::{
    default_install_root, expand_source, BufferStrategy, Installer, InstallerConfig, Manifest,
    SilentReporter,
};
use std::path::Path;

/// Build an installer from flags, falling back to the manifest entry for the app.
pub fn build_installer(app: &AppArgs, manifest_path: &Path, quiet: bool) -> Result<Installer> {
    let mut cfg = match &app.url {
        Some(template) => {
            let root = match &app.dir {
                Some(dir) => dir.clone(),
                None => default_install_root(&app.name)?,
            };
            InstallerConfig::new(&expand_source(template)?, root, &app.name)?
        }
        None => {
            let manifest = Manifest::load(manifest_path)?;
            let entry = manifest.get(&app.name).ok_or_else(|| {
                anyhow!(
                    "no --url given and '{}' is not declared in {}",
                    app.name,
                    manifest_path.display()
                )
            })?;
            let mut cfg = entry
                .to_host_config(&app.name)
                .with_context(|| format!("manifest entry for '{}'", app.name))?;
            if let Some(dir) = &app.dir {
                let mut rebuilt = InstallerConfig::new(cfg.source_url().as_str(), dir, &app.name)?
                    .with_buffer(cfg.buffer());
                if let Some(digest) = cfg.sha256() {
                    rebuilt = rebuilt.with_sha256(digest);
                }
                cfg = rebuilt;
            }
            cfg
        }
    };
    if let Some(digest) = &app.sha256 {
        cfg = cfg.with_sha256(digest.as_str());
    }
    if app.temp_file {
        cfg = cfg.with_buffer(BufferStrategy::TempFile);
    }
    let installer = Installer::new(cfg);
    Ok(if quiet {
        installer.with_reporter(Box::new(SilentReporter))
    } else {
        installer
    })
}
