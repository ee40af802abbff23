//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the
//! `.ftcache.yml` file format.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::DEFAULT_CACHE_FILE;
use crate::engine::CacheOptions;
use crate::error::{CacheError, Result};
use crate::pipeline::builtin::{Prefix, Replace, SetExtension, ShellFilter, Suffix, Wrap};
use crate::pipeline::{Named, Pipeline, StepRef};

/// Root configuration structure for `.ftcache.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache index file (relative to project root)
    pub cache: PathBuf,

    /// Use content hashes instead of modification times
    #[serde(skip_serializing_if = "is_false")]
    pub hash: bool,

    /// Log level used when `RUST_LOG` is not set
    pub logging_level: String,

    /// Upper bound on parallel batch workers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Transform steps, in execution order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<StepConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache: PathBuf::from(DEFAULT_CACHE_FILE),
            hash: false,
            logging_level: CacheOptions::DEFAULT_LOGGING_LEVEL.to_string(),
            max_concurrency: None,
            transforms: Vec::new(),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A single built-in transform step.
///
/// Exactly one of the step kinds must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Display name (defaults to the step kind)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Text to prepend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Text to append
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Text to put around the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<WrapConfig>,

    /// Regex replacement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<ReplaceConfig>,

    /// New file extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Shell command reading the content on stdin and writing the result to stdout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Arguments of a `wrap` step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapConfig {
    pub before: String,
    pub after: String,
}

/// Arguments of a `replace` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceConfig {
    /// Regular expression to search for
    pub pattern: String,

    /// Replacement text; `$1` and `${name}` refer to captures
    #[serde(default)]
    pub with: String,
}

impl StepConfig {
    /// Names of the step kinds that are set.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        if self.prefix.is_some() {
            kinds.push("prefix");
        }
        if self.suffix.is_some() {
            kinds.push("suffix");
        }
        if self.wrap.is_some() {
            kinds.push("wrap");
        }
        if self.replace.is_some() {
            kinds.push("replace");
        }
        if self.extension.is_some() {
            kinds.push("extension");
        }
        if self.command.is_some() {
            kinds.push("command");
        }
        kinds
    }

    /// Label used in validation messages.
    pub fn label(&self, position: usize) -> String {
        match &self.name {
            Some(name) => format!("'{}'", name),
            None => format!("#{}", position),
        }
    }

    /// Build the step. Shell commands run from `project_root`.
    pub fn build(&self, project_root: &Path) -> Result<StepRef> {
        let step: StepRef = if let Some(text) = &self.prefix {
            Arc::new(Prefix::new(text.as_str()))
        } else if let Some(text) = &self.suffix {
            Arc::new(Suffix::new(text.as_str()))
        } else if let Some(wrap) = &self.wrap {
            Arc::new(Wrap::new(wrap.before.as_str(), wrap.after.as_str()))
        } else if let Some(replace) = &self.replace {
            let step = Replace::new(&replace.pattern, replace.with.as_str()).map_err(|e| {
                CacheError::ConfigValidationError {
                    message: format!("Invalid pattern '{}': {}", replace.pattern, e),
                }
            })?;
            Arc::new(step)
        } else if let Some(extension) = &self.extension {
            Arc::new(SetExtension::new(extension.as_str()))
        } else if let Some(command) = &self.command {
            Arc::new(ShellFilter::new(command.as_str()).with_cwd(project_root))
        } else {
            return Err(CacheError::ConfigValidationError {
                message: "Transform step has no kind".to_string(),
            });
        };

        match &self.name {
            Some(name) => Ok(Arc::new(Named::new(name.as_str(), step))),
            None => Ok(step),
        }
    }
}

impl CacheConfig {
    /// Build engine options, resolving the cache path against `project_root`.
    pub fn to_options(&self, project_root: &Path) -> Result<CacheOptions> {
        let steps = self
            .transforms
            .iter()
            .map(|step| step.build(project_root))
            .collect::<Result<Vec<_>>>()?;

        let mut options = CacheOptions::new(project_root.join(&self.cache))
            .with_transforms(Pipeline::new(steps))
            .with_hash(self.hash)
            .with_logging_level(self.logging_level.as_str());
        if let Some(max) = self.max_concurrency {
            options = options.with_max_concurrency(max);
        }
        Ok(options)
    }
}
