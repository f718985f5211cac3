//! Default paths for Bug Smasher
//!
//! Paths are user-writable:
//! - Config: `$XDG_CONFIG_HOME/smash/config.toml` or `~/.config/smash/config.toml`
//! - Data: `$SMASH_DATA_DIR`, `$XDG_DATA_HOME/smash` or `~/.local/share/smash`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const SMASH_DATA_DIR_ENV: &str = "SMASH_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "smash";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Database filename within the data directory
pub const DATABASE_FILENAME: &str = "smash.db";

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$SMASH_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/smash` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/smash` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(SMASH_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking SMASH_DATA_DIR.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_contains_app_dir() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("smash"));
    }

    #[test]
    fn config_path_is_toml() {
        let path = default_config_path();
        assert!(path.to_string_lossy().contains("smash"));
        assert_eq!(path.extension().unwrap(), "toml");
    }
}
