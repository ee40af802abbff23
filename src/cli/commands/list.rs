//! List command implementation.
//!
//! The `ftcache list` command lists cached entries without touching the
//! index file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cache::{CacheIndex, StalenessToken};
use crate::cli::args::ListArgs;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    config: CacheConfig,
    args: ListArgs,
}

#[derive(Serialize)]
struct ListedEntry<'a> {
    path: &'a str,
    #[serde(flatten)]
    token: &'a StalenessToken,
    size: u64,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, config: CacheConfig, args: ListArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config,
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let index = CacheIndex::new(self.project_root.join(&self.config.cache));
        if index.path().is_file() {
            index.load()?;
        }
        let entries = index.entries();

        if self.args.json {
            let listed: Vec<_> = entries
                .iter()
                .map(|e| ListedEntry {
                    path: &e.path,
                    token: &e.token,
                    size: e.size_bytes(),
                })
                .collect();
            let json = serde_json::to_string_pretty(&listed)
                .map_err(|e| anyhow::anyhow!("failed to serialize listing: {}", e))?;
            ui.data(format!("{}\n", json).as_bytes())?;
            return Ok(CommandResult::success());
        }

        if entries.is_empty() {
            ui.message(&format!("No cached entries in {}", index.path().display()));
            return Ok(CommandResult::success());
        }

        for entry in &entries {
            ui.data(
                format!(
                    "{}\t{}\t{} bytes\n",
                    entry.path,
                    entry.token.describe(),
                    entry.size_bytes()
                )
                .as_bytes(),
            )?;
        }
        ui.message(&format!("{} cached entries", entries.len()));

        Ok(CommandResult::success())
    }
}
