//! Where kustodian keeps its configuration

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "KUSTODIAN_CONFIG_DIR";

const APP_NAME: &str = "kustodian";

/// Configuration directory
///
/// Resolution order: `$KUSTODIAN_CONFIG_DIR`, `$XDG_CONFIG_HOME/kustodian`,
/// then the platform config dir. Falls back to `./.kustodian` when no home
/// directory can be determined.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join(APP_NAME);
    }
    ProjectDirs::from("io", APP_NAME, APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{}", APP_NAME)))
}

pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Create `path` and its parents; existing directories are left alone
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_config_path_is_yaml() {
        assert!(root_config_path().ends_with("config.yaml"));
    }

    #[test]
    fn test_ensure_dir_creates_nested_directories() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
