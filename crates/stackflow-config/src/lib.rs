//! StackFlow configuration
//!
//! Locates and loads `stackflow.yaml`.

pub mod error;
pub mod settings;

pub use error::*;
pub use settings::StackflowConfig;

use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "STACKFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 4] = [
    "stackflow.local.yaml",
    ".stackflow.local.yaml",
    "stackflow.yaml",
    ".stackflow.yaml",
];

/// Global configuration directory (`~/.config/stackflow` on Linux)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("stackflow"))
}

/// Find the configuration file.
///
/// Search order:
/// 1. `STACKFLOW_CONFIG_PATH`
/// 2. current directory: stackflow.local.yaml, .stackflow.local.yaml, stackflow.yaml, .stackflow.yaml
/// 3. `./.stackflow/`, same order
/// 4. `<config dir>/stackflow/stackflow.yaml`
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(path = %path.display(), "{} points at a missing file", CONFIG_PATH_ENV);
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(".stackflow");
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("stackflow.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}
