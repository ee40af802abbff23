//! The transform step contract.

use std::fmt;
use std::sync::Arc;

use crate::file::SourceFile;

/// One stage of a transform pipeline.
///
/// A step receives the file produced by the previous stage and returns
/// the file for the next one. It may rewrite the content, the path, or
/// both. Steps are shared between threads in batch runs, so they must be
/// `Send + Sync`; per-call state belongs in the file, not the step.
pub trait TransformStep: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Transform `file`.
    fn apply(&self, file: SourceFile) -> anyhow::Result<SourceFile>;
}

/// Shared handle to a step.
pub type StepRef = Arc<dyn TransformStep>;

/// A step backed by a closure.
pub struct FnStep<F> {
    name: String,
    func: F,
}

impl<F> FnStep<F>
where
    F: Fn(SourceFile) -> anyhow::Result<SourceFile> + Send + Sync,
{
    /// Wrap `func` as a step called `name`.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> TransformStep for FnStep<F>
where
    F: Fn(SourceFile) -> anyhow::Result<SourceFile> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, file: SourceFile) -> anyhow::Result<SourceFile> {
        (self.func)(file)
    }
}

impl<F> fmt::Debug for FnStep<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep").field("name", &self.name).finish()
    }
}

/// Another step under a different name.
pub struct Named {
    name: String,
    inner: StepRef,
}

impl Named {
    /// Report `inner` under `name`.
    pub fn new(name: impl Into<String>, inner: StepRef) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }
}

impl TransformStep for Named {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, file: SourceFile) -> anyhow::Result<SourceFile> {
        self.inner.apply(file)
    }
}

impl fmt::Debug for Named {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Named")
            .field("name", &self.name)
            .field("inner", &self.inner.name())
            .finish()
    }
}

/// Build a shared step from a closure.
pub fn step_fn<F>(name: impl Into<String>, func: F) -> StepRef
where
    F: Fn(SourceFile) -> anyhow::Result<SourceFile> + Send + Sync + 'static,
{
    Arc::new(FnStep::new(name, func))
}
