//! Error types for transform cache operations.
//!
//! This module defines [`CacheError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every error reaches the immediate caller; nothing is swallowed
//! - Only the batch operation downgrades a per-file error into its outcome
//! - Transform steps report failures with `anyhow::Error`, which is wrapped
//!   into [`CacheError::StepFailed`] together with the step's name

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for transform cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// `transform` was given something that is neither a readable path nor a file handle.
    #[error("Invalid transform input: {message}")]
    InvalidInput { message: String },

    /// A streaming file reached the pipeline, which needs buffered content.
    #[error("Streaming not supported: {path}")]
    UnsupportedFileKind { path: PathBuf },

    /// A configured transform step reported an error.
    #[error("Transform step '{step}' (#{position}) failed: {source}")]
    StepFailed {
        step: String,
        position: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The source file could not be read or stat'd.
    #[error("Source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file exists but could not be read.
    #[error("Failed to read cache index at {path}: {source}")]
    IndexLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file is not a valid index document.
    #[error("Failed to parse cache index at {path}: {message}")]
    IndexParse { path: PathBuf, message: String },

    /// The cache index could not be written.
    #[error("Failed to save cache index to {path}: {message}")]
    IndexSave { path: PathBuf, message: String },

    /// A glob pattern could not be compiled.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Directory traversal failed while resolving a pattern.
    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CacheError {
    /// Build a [`CacheError::SourceUnavailable`] for `path`.
    pub fn source_unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for transform cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
