//! file-transform-cache - Staleness-aware caching for file transform pipelines.
//!
//! A [`TransformCache`] runs a [`Pipeline`] of transform steps over source
//! files and remembers the output, keyed by the original source path. A
//! cached output is served again as long as the source has not changed,
//! judged either by modification time or by content hash.
//!
//! # Modules
//!
//! - [`cache`] - Cache entries, the disk-mirrored index, and staleness checks
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - `.ftcache.yml` loading, parsing, and validation
//! - [`engine`] - The transform cache and parallel batches
//! - [`error`] - Error types and result aliases
//! - [`file`] - In-memory source files with path history
//! - [`glob`] - Resolving glob patterns to files
//! - [`pipeline`] - Transform steps and pipelines
//! - [`shell`] - Running shell filter commands
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use file_transform_cache::pipeline::builtin::Wrap;
//! use file_transform_cache::{CacheOptions, TransformCache};
//! use std::fs;
//! use std::sync::Arc;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let source = temp.path().join("greeting.txt");
//! fs::write(&source, "hello").unwrap();
//!
//! let cache = TransformCache::new(
//!     CacheOptions::new(temp.path().join(".ftcache.json"))
//!         .with_transform(Arc::new(Wrap::new("[", "]"))),
//! )
//! .unwrap();
//!
//! let out = cache.transform(&source).unwrap();
//! assert_eq!(out.contents_lossy(), "[hello]");
//! assert!(cache.save().unwrap());
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod file;
pub mod glob;
pub mod pipeline;
pub mod shell;
pub mod ui;

pub use cache::{CacheEntry, StalenessPolicy, StalenessToken};
pub use engine::{BatchOutcome, BatchSummary, CacheOptions, TransformCache};
pub use error::{CacheError, Result};
pub use file::{SourceFile, TransformInput};
pub use glob::GlobOptions;
pub use pipeline::{Pipeline, StepRef, TransformStep};
