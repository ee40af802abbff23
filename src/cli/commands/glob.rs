//! Glob command implementation.
//!
//! The `ftcache glob` command transforms every file matching a pattern
//! relative to the project root.

use std::path::{Path, PathBuf};

use crate::cli::args::GlobArgs;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::glob::GlobOptions;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::output::{open_cache, report};

/// The glob command implementation.
pub struct GlobCommand {
    project_root: PathBuf,
    config: CacheConfig,
    args: GlobArgs,
}

impl GlobCommand {
    /// Create a new glob command.
    pub fn new(project_root: &Path, config: CacheConfig, args: GlobArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config,
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &GlobArgs {
        &self.args
    }
}

impl Command for GlobCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let cache = open_cache(&self.project_root, &self.config)?;
        let options = GlobOptions::default()
            .with_cwd(&self.project_root)
            .with_dot(self.args.dot);

        let outcomes = cache.transform_glob(&self.args.pattern, &options)?;
        if outcomes.is_empty() {
            ui.warning(&format!("No files match '{}'", self.args.pattern));
            return Ok(CommandResult::success());
        }

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
