//! Shared helpers for commands that run transforms.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::CacheConfig;
use crate::engine::{BatchOutcome, BatchSummary, TransformCache};
use crate::error::Result;
use crate::file::SourceFile;
use crate::ui::UserInterface;

/// Open the cache described by `config`.
pub fn open_cache(project_root: &Path, config: &CacheConfig) -> Result<TransformCache> {
    TransformCache::new(config.to_options(project_root)?)
}

/// Where a transformed file lands under `out_dir`.
///
/// Paths inside the project root keep their relative layout. Anything else
/// keeps only its normal components, or just the file name when it is
/// absolute and outside the root.
pub fn output_path(out_dir: &Path, project_root: &Path, path: &Path) -> PathBuf {
    let relative = match path.strip_prefix(project_root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) if path.is_absolute() => path.file_name().map(PathBuf::from).unwrap_or_default(),
        Err(_) => path
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect(),
    };
    out_dir.join(relative)
}

/// Print a transformed file to stdout or write it under `out_dir`.
pub fn emit(
    ui: &mut dyn UserInterface,
    project_root: &Path,
    out_dir: Option<&Path>,
    file: &SourceFile,
) -> Result<()> {
    let contents = file.contents().unwrap_or_default();
    match out_dir {
        Some(dir) => {
            let target = output_path(dir, project_root, file.path());
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, contents)?;
            tracing::debug!(path = %target.display(), "wrote output");
            ui.message(&format!("{} -> {}", file.original_path().display(), target.display()));
        }
        None => ui.data(contents)?,
    }
    Ok(())
}

/// Emit every successful outcome, report every failure, and summarize.
pub fn report(
    ui: &mut dyn UserInterface,
    project_root: &Path,
    out_dir: Option<&Path>,
    outcomes: &[BatchOutcome],
) -> Result<BatchSummary> {
    for outcome in outcomes {
        match &outcome.result {
            Ok(file) => emit(ui, project_root, out_dir, file)?,
            Err(e) => ui.error(&format!("{}: {}", outcome.path.display(), e)),
        }
    }

    let summary = BatchSummary::of(outcomes);
    if summary.failed == 0 {
        ui.success(&format!("{} file(s) transformed", summary.succeeded));
    } else {
        ui.warning(&format!(
            "{} file(s) transformed, {} failed",
            summary.succeeded, summary.failed
        ));
    }
    Ok(summary)
}
