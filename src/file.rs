//! File handles flowing through the transform pipeline.
//!
//! A [`SourceFile`] carries its content together with a path history:
//! the first entry is the path the file was originally read from, the
//! last entry is its current path. Steps that rename a file (for example
//! rewriting `.ts` to `.js`) append to the history, which keeps the
//! original source path available as the cache key.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{CacheError, Result};

/// Content of a [`SourceFile`].
pub enum FileContents {
    /// Fully materialized bytes.
    Buffered(Vec<u8>),

    /// A reader that has not been drained. The pipeline rejects these.
    Streaming(Box<dyn Read + Send>),
}

impl fmt::Debug for FileContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContents::Buffered(bytes) => f
                .debug_struct("Buffered")
                .field("len", &bytes.len())
                .finish(),
            FileContents::Streaming(_) => f.write_str("Streaming"),
        }
    }
}

/// A file with a path history and content.
#[derive(Debug)]
pub struct SourceFile {
    history: Vec<PathBuf>,
    contents: FileContents,
}

impl SourceFile {
    /// Create a buffered file at `path`.
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            history: vec![path.into()],
            contents: FileContents::Buffered(contents.into()),
        }
    }

    /// Create a streaming file at `path`.
    pub fn streaming(path: impl Into<PathBuf>, reader: impl Read + Send + 'static) -> Self {
        Self {
            history: vec![path.into()],
            contents: FileContents::Streaming(Box::new(reader)),
        }
    }

    /// Read the file at `path` fully into memory.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| CacheError::source_unavailable(path, e))?;
        Ok(Self::new(path, bytes))
    }

    /// Rebuild a file from an explicit history.
    ///
    /// Returns `None` when `history` is empty.
    pub fn with_history(history: Vec<PathBuf>, contents: FileContents) -> Option<Self> {
        if history.is_empty() {
            return None;
        }
        Some(Self { history, contents })
    }

    /// Current path of the file.
    pub fn path(&self) -> &Path {
        self.history
            .last()
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Path the file was first created with.
    pub fn original_path(&self) -> &Path {
        self.history
            .first()
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// All paths this file has had, oldest first.
    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    /// Move the file to `path`, recording the old one in the history.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if self.path() != path {
            self.history.push(path);
        }
    }

    /// Replace the extension of the current path.
    ///
    /// Accepts the extension with or without a leading dot.
    pub fn set_extension(&mut self, extension: &str) {
        let extension = extension.trim_start_matches('.');
        let renamed = self.path().with_extension(extension);
        self.set_path(renamed);
    }

    /// Whether the content is fully buffered.
    pub fn is_buffered(&self) -> bool {
        matches!(self.contents, FileContents::Buffered(_))
    }

    /// Whether the content is an undrained stream.
    pub fn is_streaming(&self) -> bool {
        matches!(self.contents, FileContents::Streaming(_))
    }

    /// Buffered content, or `None` for streaming files.
    pub fn contents(&self) -> Option<&[u8]> {
        match &self.contents {
            FileContents::Buffered(bytes) => Some(bytes.as_slice()),
            FileContents::Streaming(_) => None,
        }
    }

    /// Buffered content as text, replacing invalid UTF-8.
    pub fn contents_lossy(&self) -> String {
        self.contents()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }

    /// Replace the content with a buffer.
    pub fn set_contents(&mut self, contents: impl Into<Vec<u8>>) {
        self.contents = FileContents::Buffered(contents.into());
    }

    /// Consume the file, returning its buffered bytes.
    pub fn into_contents(self) -> Option<Vec<u8>> {
        match self.contents {
            FileContents::Buffered(bytes) => Some(bytes),
            FileContents::Streaming(_) => None,
        }
    }
}

/// Anything `transform` accepts: a path to read, or a file handle.
#[derive(Debug)]
pub enum TransformInput {
    /// Path read fully into memory before transforming.
    Path(PathBuf),

    /// An already materialized file.
    File(SourceFile),
}

impl TransformInput {
    /// Turn the input into a file handle.
    ///
    /// Empty paths and empty histories are rejected with
    /// [`CacheError::InvalidInput`] before any I/O happens.
    pub fn into_file(self) -> Result<SourceFile> {
        match self {
            TransformInput::Path(path) => {
                if path.as_os_str().is_empty() {
                    return Err(CacheError::InvalidInput {
                        message: "path is empty".to_string(),
                    });
                }
                SourceFile::read(path)
            }
            TransformInput::File(file) => {
                if file.history.is_empty() || file.path().as_os_str().is_empty() {
                    return Err(CacheError::InvalidInput {
                        message: "file handle has no path".to_string(),
                    });
                }
                Ok(file)
            }
        }
    }
}

impl From<&str> for TransformInput {
    fn from(path: &str) -> Self {
        TransformInput::Path(PathBuf::from(path))
    }
}

impl From<String> for TransformInput {
    fn from(path: String) -> Self {
        TransformInput::Path(PathBuf::from(path))
    }
}

impl From<&Path> for TransformInput {
    fn from(path: &Path) -> Self {
        TransformInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for TransformInput {
    fn from(path: PathBuf) -> Self {
        TransformInput::Path(path)
    }
}

impl From<&PathBuf> for TransformInput {
    fn from(path: &PathBuf) -> Self {
        TransformInput::Path(path.clone())
    }
}

impl From<SourceFile> for TransformInput {
    fn from(file: SourceFile) -> Self {
        TransformInput::File(file)
    }
}
