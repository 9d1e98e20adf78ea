use crate::errors::{InsbinError, Result};
use flate2::read::GzDecoder;
use fs_err as fs;
use log::{debug, warn};
use std::io::Read;
use std::path::Path;
use tar::Archive;

#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveInstaller;

impl ArchiveInstaller {
    pub fn new() -> Self {
        ArchiveInstaller
    }

    /// Unpack a gzip-compressed tar stream into `destination`, keeping
    /// relative paths and permission bits. Returns the number of entries.
    pub fn extract<R: Read>(&self, reader: R, destination: &Path) -> Result<usize> {
        let mut archive = Archive::new(GzDecoder::new(reader));
        archive.set_preserve_permissions(true);
        archive.set_overwrite(true);

        let mut count = 0;
        let entries = archive
            .entries()
            .map_err(|e| InsbinError::extraction(e.to_string()))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| InsbinError::extraction(e.to_string()))?;
            let path = entry
                .path()
                .map(|p| p.into_owned())
                .map_err(|e| InsbinError::extraction(e.to_string()))?;
            let unpacked = entry.unpack_in(destination).map_err(|e| {
                InsbinError::extraction(format!("{}: {e}", path.display()))
            })?;
            if !unpacked {
                warn!("skipping archive entry outside destination: {}", path.display());
                continue;
            }
            count += 1;
        }
        if count == 0 {
            debug!("archive has no entries, nothing extracted");
        }
        Ok(count)
    }

    /// Extract into a staging directory next to `destination` and rename it
    /// into place on success. On failure `destination` is never created.
    pub fn install_into<R: Read>(&self, reader: R, destination: &Path) -> Result<usize> {
        let parent = destination.parent().ok_or_else(|| {
            InsbinError::extraction(format!("{} has no parent", destination.display()))
        })?;
        let staging = tempfile::Builder::new()
            .prefix(".bin-staging-")
            .tempdir_in(parent)
            .map_err(|e| InsbinError::filesystem(parent, e))?;

        let count = self.extract(reader, staging.path())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(staging.path(), std::fs::Permissions::from_mode(0o755))
                .map_err(|e| InsbinError::filesystem(staging.path(), e))?;
        }
        fs::rename(staging.path(), destination)
            .map_err(|e| InsbinError::filesystem(destination, e))?;
        debug!("extracted {count} entries into {}", destination.display());
        // `staging` now points at a moved path; its cleanup on drop is a no-op.
        Ok(count)
    }
}
