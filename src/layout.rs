use crate::errors::{InsbinError, Result};
use fs_err as fs;
use log::info;
use std::path::{Path, PathBuf};

pub const BIN_DIR: &str = "bin";

/// On-disk layout of one installation: `root/bin/<app>`.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        InstallLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn binary_directory(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    pub fn is_installed(&self) -> bool {
        self.binary_directory().is_dir()
    }

    /// Wipe and recreate the root. The root is owned by this installation,
    /// anything already in it is removed.
    pub fn ensure_install_root(&self) -> Result<&Path> {
        let root = self.root.as_path();
        if root.is_dir() {
            info!("removing current installation: {}", root.display());
            fs::remove_dir_all(root).map_err(|e| InsbinError::filesystem(root, e))?;
            info!("recreating installation: {}", root.display());
        }
        fs::create_dir_all(root).map_err(|e| InsbinError::filesystem(root, e))?;
        Ok(root)
    }

    /// `root/bin`, or `NotInstalled` when it does not exist yet.
    pub fn resolve_binary_directory(&self) -> Result<PathBuf> {
        let dir = self.binary_directory();
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(InsbinError::NotInstalled { path: dir })
        }
    }

    pub fn resolve_binary_path(&self, app_name: &str) -> Result<PathBuf> {
        Ok(self.resolve_binary_directory()?.join(app_name))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn creates_missing_root() {
        let td = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(td.path().join("nested").join(".app"));
        let root = layout.ensure_install_root().unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn recreates_existing_root_empty() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path().join(".app");
        std::fs::create_dir_all(root.join("old/deep")).unwrap();
        std::fs::write(root.join("unrelated.txt"), "keep me?").unwrap();

        let layout = InstallLayout::new(&root);
        layout.ensure_install_root().unwrap();
        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn root_that_is_a_file_is_filesystem_error() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path().join("occupied");
        std::fs::write(&root, "file").unwrap();
        let err = InstallLayout::new(&root).ensure_install_root().unwrap_err();
        assert!(matches!(err, InsbinError::Filesystem { .. }), "{err}");
    }

    #[test]
    fn binary_directory_signals_not_installed() {
        let td = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(td.path());
        assert!(!layout.is_installed());
        assert!(matches!(
            layout.resolve_binary_path("app"),
            Err(InsbinError::NotInstalled { .. })
        ));

        std::fs::create_dir(td.path().join(BIN_DIR)).unwrap();
        assert!(layout.is_installed());
        assert_eq!(
            layout.resolve_binary_path("app").unwrap(),
            td.path().join("bin").join("app")
        );
    }
}
