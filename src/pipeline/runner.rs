//! Sequential pipeline execution.

use std::sync::Arc;
use std::time::Instant;

use super::step::{StepRef, TransformStep};
use crate::error::{CacheError, Result};
use crate::file::SourceFile;

/// An ordered list of transform steps.
///
/// Steps run strictly one after another; each receives the previous
/// step's output unmodified. The first failure stops the run.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<StepRef>,
}

impl Pipeline {
    /// Create a pipeline from steps in execution order.
    pub fn new(steps: Vec<StepRef>) -> Self {
        Self { steps }
    }

    /// A pipeline that returns its input unchanged.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn push(&mut self, step: impl TransformStep + 'static) {
        self.steps.push(Arc::new(step));
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step over `file`.
    ///
    /// Streaming files are rejected before any step runs, and again if a
    /// step hands a streaming file to the next one.
    pub fn run(&self, file: SourceFile) -> Result<SourceFile> {
        let mut current = file;

        for (position, step) in self.steps.iter().enumerate() {
            if current.is_streaming() {
                return Err(CacheError::UnsupportedFileKind {
                    path: current.path().to_path_buf(),
                });
            }

            let start = Instant::now();
            tracing::debug!(
                step = step.name(),
                position,
                path = %current.path().display(),
                "running transform step"
            );

            current = step
                .apply(current)
                .map_err(|source| CacheError::StepFailed {
                    step: step.name().to_string(),
                    position,
                    source,
                })?;

            tracing::debug!(
                step = step.name(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "transform step finished"
            );
        }

        if current.is_streaming() {
            return Err(CacheError::UnsupportedFileKind {
                path: current.path().to_path_buf(),
            });
        }

        Ok(current)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.step_names()).finish()
    }
}

impl From<Vec<StepRef>> for Pipeline {
    fn from(steps: Vec<StepRef>) -> Self {
        Self::new(steps)
    }
}

impl From<StepRef> for Pipeline {
    fn from(step: StepRef) -> Self {
        Self::new(vec![step])
    }
}
