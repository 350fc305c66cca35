//! Platform-specific configuration paths.

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Configuration directory for the current platform.
///
/// - Linux: `~/.config/quietcut/`
/// - macOS: `~/Library/Application Support/quietcut/`
/// - Windows: `%APPDATA%\quietcut\config\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Full path to `config.toml`.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_path_is_under_app_dir() {
        let path = config_file_path().unwrap();
        assert!(path.ends_with("config.toml"));
        assert!(path.to_string_lossy().contains("quietcut"));
        assert_eq!(path.parent().unwrap(), config_dir().unwrap());
    }
}
