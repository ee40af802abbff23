//! Cache entry and staleness token types.

use serde::{Deserialize, Serialize};

/// Fingerprint of a source file at the moment its output was cached.
///
/// Serialized inline with the entry, so the persisted object carries either
/// a `timestamp` or a `hash` field, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StalenessToken {
    /// Source modification time in epoch milliseconds.
    Timestamp { timestamp: i64 },

    /// Hex digest of the source bytes.
    Hash { hash: String },
}

impl StalenessToken {
    /// Short human-readable form for listings.
    pub fn describe(&self) -> String {
        match self {
            StalenessToken::Timestamp { timestamp } => format!("mtime {}", timestamp),
            StalenessToken::Hash { hash } => {
                format!("sha256 {}", hash.chars().take(12).collect::<String>())
            }
        }
    }
}

/// A cached transform output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Original source path; duplicates the index key.
    pub path: String,

    /// Fully transformed output.
    pub content: String,

    /// Token used to decide whether the entry is still valid.
    #[serde(flatten)]
    pub token: StalenessToken,
}

impl CacheEntry {
    /// Create a new cache entry.
    pub fn new(path: impl Into<String>, content: impl Into<String>, token: StalenessToken) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            token,
        }
    }

    /// Size of the cached output in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}
