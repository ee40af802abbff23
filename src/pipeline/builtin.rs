//! Built-in transform steps.
//!
//! These are the steps the `ftcache` binary builds from its YAML config.
//! Library users are free to implement [`TransformStep`] directly instead.

use anyhow::{bail, Context};
use regex::Regex;
use std::path::PathBuf;

use super::step::TransformStep;
use crate::file::SourceFile;
use crate::shell::run_filter;

fn text(file: &SourceFile) -> anyhow::Result<String> {
    let bytes = file
        .contents()
        .with_context(|| format!("{} has no buffered content", file.path().display()))?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Prepends fixed text.
#[derive(Debug, Clone)]
pub struct Prefix {
    text: String,
}

impl Prefix {
    /// Prepend `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TransformStep for Prefix {
    fn name(&self) -> &str {
        "prefix"
    }

    fn apply(&self, mut file: SourceFile) -> anyhow::Result<SourceFile> {
        let content = format!("{}{}", self.text, text(&file)?);
        file.set_contents(content);
        Ok(file)
    }
}

/// Appends fixed text.
#[derive(Debug, Clone)]
pub struct Suffix {
    text: String,
}

impl Suffix {
    /// Append `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TransformStep for Suffix {
    fn name(&self) -> &str {
        "suffix"
    }

    fn apply(&self, mut file: SourceFile) -> anyhow::Result<SourceFile> {
        let content = format!("{}{}", text(&file)?, self.text);
        file.set_contents(content);
        Ok(file)
    }
}

/// Surrounds the content with two pieces of text.
#[derive(Debug, Clone)]
pub struct Wrap {
    before: String,
    after: String,
}

impl Wrap {
    /// Surround the contents with `before` and `after`.
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

impl TransformStep for Wrap {
    fn name(&self) -> &str {
        "wrap"
    }

    fn apply(&self, mut file: SourceFile) -> anyhow::Result<SourceFile> {
        let content = format!("{}{}{}", self.before, text(&file)?, self.after);
        file.set_contents(content);
        Ok(file)
    }
}

/// Replaces every regex match.
///
/// The replacement supports `$1`/`${name}` capture references.
#[derive(Debug, Clone)]
pub struct Replace {
    pattern: Regex,
    with: String,
}

impl Replace {
    /// Compile `pattern`.
    pub fn new(pattern: &str, with: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            with: with.into(),
        })
    }
}

impl TransformStep for Replace {
    fn name(&self) -> &str {
        "replace"
    }

    fn apply(&self, mut file: SourceFile) -> anyhow::Result<SourceFile> {
        let source = text(&file)?;
        let replaced = self.pattern.replace_all(&source, self.with.as_str());
        file.set_contents(replaced.into_owned());
        Ok(file)
    }
}

/// Rewrites the extension of the file's path.
#[derive(Debug, Clone)]
pub struct SetExtension {
    extension: String,
}

impl SetExtension {
    /// Rename to `extension`, with or without its leading dot.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl TransformStep for SetExtension {
    fn name(&self) -> &str {
        "extension"
    }

    fn apply(&self, mut file: SourceFile) -> anyhow::Result<SourceFile> {
        file.set_extension(&self.extension);
        Ok(file)
    }
}

/// Pipes the content through a shell command.
///
/// The command's stdout becomes the new content. A non-zero exit fails
/// the step with the command's stderr.
#[derive(Debug, Clone)]
pub struct ShellFilter {
    command: String,
    cwd: Option<PathBuf>,
}

impl ShellFilter {
    /// Pipe the contents through `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
        }
    }

    /// Run the command from `cwd`.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl TransformStep for ShellFilter {
    fn name(&self) -> &str {
        &self.command
    }

    fn apply(&self, mut file: SourceFile) -> anyhow::Result<SourceFile> {
        let input = file
            .contents()
            .with_context(|| format!("{} has no buffered content", file.path().display()))?;

        let output = run_filter(&self.command, input, self.cwd.as_deref())
            .with_context(|| format!("Failed to run `{}`", self.command))?;

        if !output.success {
            bail!(
                "`{}` exited with code {:?}: {}",
                self.command,
                output.exit_code,
                output.stderr.trim()
            );
        }

        file.set_contents(output.stdout);
        Ok(file)
    }
}
