//! Resolving glob patterns to file paths.
//!
//! Patterns follow the usual shell conventions: `*` and `?` stay within
//! one path segment, `**` crosses directories, `{a,b}` picks alternatives.
//! Only regular files are returned, sorted by path.

use globset::GlobBuilder;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{CacheError, Result};

/// Options for [`resolve`].
#[derive(Debug, Clone, Default)]
pub struct GlobOptions {
    /// Directory relative patterns are resolved against. Defaults to the
    /// process working directory, in which case results stay relative.
    pub cwd: Option<PathBuf>,

    /// Match files and directories whose names start with a dot.
    pub dot: bool,

    /// Follow symbolic links to directories.
    pub follow_links: bool,
}

impl GlobOptions {
    /// Resolve relative patterns against `cwd`.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Include dotfiles.
    pub fn with_dot(mut self, dot: bool) -> Self {
        self.dot = dot;
        self
    }
}

/// Find every file matching `pattern`.
///
/// A pattern whose base directory does not exist matches nothing.
pub fn resolve(pattern: &str, options: &GlobOptions) -> Result<Vec<PathBuf>> {
    let raw = pattern;
    let pattern = strip_current_dir(pattern);
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| CacheError::InvalidPattern {
            pattern: raw.to_string(),
            message: e.to_string(),
        })?
        .compile_matcher();

    let absolute = Path::new(pattern).is_absolute();
    let root = options.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
    let prefix = literal_prefix(pattern);
    let base = if prefix.as_os_str().is_empty() {
        root.clone()
    } else {
        root.join(&prefix)
    };

    if !base.exists() {
        tracing::debug!(pattern, base = %base.display(), "glob base does not exist");
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(&base)
        .follow_links(options.follow_links)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || options.dot || !is_hidden(e));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                tracing::warn!(error = %e, "skipping unreadable path while resolving glob");
                continue;
            }
            Err(e) => {
                return Err(CacheError::Walk {
                    path: base.clone(),
                    message: e.to_string(),
                })
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let candidate = if absolute {
            path.to_path_buf()
        } else {
            path.strip_prefix(&root).unwrap_or(path).to_path_buf()
        };

        if matcher.is_match(&candidate) {
            files.push(match (&options.cwd, absolute) {
                (Some(cwd), false) => cwd.join(&candidate),
                _ => candidate,
            });
        }
    }

    files.sort();
    tracing::debug!(pattern, matches = files.len(), "resolved glob");
    Ok(files)
}

/// `pattern` without leading `./` segments, which candidates never carry.
fn strip_current_dir(pattern: &str) -> &str {
    let mut rest = pattern;
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped.trim_start_matches('/');
    }
    rest
}

/// Leading path components of `pattern` that contain no glob syntax.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    let components: Vec<Component<'_>> = Path::new(pattern).components().collect();

    // The last component is the file part; never treat it as a directory.
    for component in components.iter().take(components.len().saturating_sub(1)) {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[', '{']) {
            break;
        }
        prefix.push(component);
    }
    prefix
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
