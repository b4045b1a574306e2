//! Where fieldscan keeps its files.
//!
//! ```text
//! <config_dir>/fieldscan/settings.toml
//! <data_local_dir>/fieldscan/exports/      default download target
//! ```
//!
//! `<config_dir>` and `<data_local_dir>` are the `dirs` crate's platform
//! directories (`~/.config` and `~/.local/share` on Linux, `%APPDATA%` and
//! `%LOCALAPPDATA%` on Windows, `~/Library/Application Support` on macOS).

use std::path::{Path, PathBuf};

const APP_DIR: &str = "fieldscan";
const SETTINGS_FILE: &str = "settings.toml";
const EXPORTS_DIR: &str = "exports";

/// Resolved application paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Used when `export.dir` is unset.
    pub exports_dir: PathBuf,
}

impl AppPaths {
    /// Platform paths; the current directory stands in for a platform
    /// directory that cannot be determined.
    pub fn new() -> Self {
        let here = || PathBuf::from(".");
        Self::under(
            &dirs::config_dir().unwrap_or_else(here),
            &dirs::data_local_dir().unwrap_or_else(here),
        )
    }

    /// Layout below explicit roots.
    pub fn under(config_root: &Path, data_root: &Path) -> Self {
        let config_dir = config_root.join(APP_DIR);
        Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            config_dir,
            exports_dir: data_root.join(APP_DIR).join(EXPORTS_DIR),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_below_roots() {
        let paths = AppPaths::under(Path::new("/cfg"), Path::new("/data"));
        assert_eq!(paths.config_dir, Path::new("/cfg/fieldscan"));
        assert_eq!(paths.settings_file, Path::new("/cfg/fieldscan/settings.toml"));
        assert_eq!(paths.exports_dir, Path::new("/data/fieldscan/exports"));
    }

    #[test]
    fn platform_paths_end_in_app_dir() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.ends_with(APP_DIR));
        assert!(paths.settings_file.starts_with(&paths.config_dir));
        assert!(paths.exports_dir.ends_with("fieldscan/exports"));
    }
}
