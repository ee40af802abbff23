//! Transform command implementation.
//!
//! The `ftcache transform` command transforms explicitly named files.

use std::path::{Path, PathBuf};

use crate::cli::args::TransformArgs;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::output::{open_cache, report};

/// The transform command implementation.
pub struct TransformCommand {
    project_root: PathBuf,
    config: CacheConfig,
    args: TransformArgs,
}

impl TransformCommand {
    /// Create a new transform command.
    pub fn new(project_root: &Path, config: CacheConfig, args: TransformArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config,
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &TransformArgs {
        &self.args
    }
}

impl Command for TransformCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let cache = open_cache(&self.project_root, &self.config)?;

        let files: Vec<PathBuf> = self
            .args
            .files
            .iter()
            .map(|file| self.project_root.join(file))
            .collect();
        let outcomes = cache.transform_paths(&files);
        let reported = report(
            ui,
            &self.project_root,
            self.args.out_dir.as_deref(),
            &outcomes,
        );

        // Keep fresh entries even when an output could not be written.
        if cache.save()? {
            tracing::debug!(path = %cache.path().display(), "saved cache index");
        }
        let summary = reported?;

        if summary.failed > 0 {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}
