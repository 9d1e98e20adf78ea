use crate::platform::PlatformOps;
use std::path::{Path, PathBuf};

pub static WINDOWS_PLATFORM: Windows = Windows;

pub struct Windows;

impl PlatformOps for Windows {
    fn home_dir(&self) -> Option<PathBuf> { dirs::home_dir().or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from)) }
    fn is_executable(&self, path: &Path) -> bool { path.is_file() }
}
