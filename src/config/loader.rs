//! Configuration file discovery and loading.

use crate::config::schema::CacheConfig;
use crate::error::{CacheError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = ".ftcache.yml";

/// Find the project config at `<project_root>/.ftcache.yml`.
pub fn find_config(project_root: &Path) -> Option<PathBuf> {
    let path = project_root.join(CONFIG_FILE);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Load a single config file and parse it into CacheConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<CacheConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CacheError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CacheError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into CacheConfig.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<CacheConfig> {
    if content.trim().is_empty() {
        return Ok(CacheConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| CacheError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
///
/// An explicit path must exist. Without one, `.ftcache.yml` in the project
/// root is used when present and defaults apply otherwise.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<CacheConfig> {
    if let Some(override_path) = config_override {
        return load_config_file(override_path);
    }

    match find_config(project_root) {
        Some(path) => load_config_file(&path),
        None => {
            tracing::debug!(root = %project_root.display(), "no config file, using defaults");
            Ok(CacheConfig::default())
        }
    }
}
