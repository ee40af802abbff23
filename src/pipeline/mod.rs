//! Transform pipelines.
//!
//! - [`TransformStep`] - The single-input, single-output step contract
//! - [`Pipeline`] - Ordered steps run one after another, stopping at the first failure
//! - [`builtin`] - Ready-made steps used by the `ftcache` binary
//!
//! # Example
//!
//! ```
//! use file_transform_cache::file::SourceFile;
//! use file_transform_cache::pipeline::{builtin::Wrap, Pipeline};
//!
//! let mut pipeline = Pipeline::identity();
//! pipeline.push(Wrap::new("[", "]"));
//!
//! let out = pipeline.run(SourceFile::new("hello.txt", "hello")).unwrap();
//! assert_eq!(out.contents_lossy(), "[hello]");
//! ```

pub mod builtin;
pub mod runner;
pub mod step;

pub use runner::Pipeline;
pub use step::{step_fn, FnStep, Named, StepRef, TransformStep};
