//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use file_transform_cache::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".ftcache.yml"), "hash: true").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! validate(&config).unwrap();
//! assert!(config.hash);
//! ```
//!
//! # Configuration File
//!
//! `.ftcache.yml` lives in the project root. When it is missing, defaults
//! apply. An explicit `--config` path must exist.

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{find_config, load_config, load_config_file, parse_config, CONFIG_FILE};
pub use schema::{CacheConfig, ReplaceConfig, StepConfig, WrapConfig};
pub use validator::{validate, validate_config, ValidationError};
