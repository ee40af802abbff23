//! Staleness detection for cached entries.
//!
//! A [`StalenessPolicy`] is chosen once per cache and decides how the
//! token stored with each entry is produced and compared:
//!
//! - [`StalenessPolicy::Timestamp`] records the source modification time
//!   and accepts the entry while the stored time is at least the current
//!   one.
//! - [`StalenessPolicy::Hash`] records a SHA-256 digest of the source bytes
//!   and accepts the entry while the digest matches.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::entry::{CacheEntry, StalenessToken};
use super::index::CacheIndex;
use crate::error::{CacheError, Result};

/// How cached entries are checked for freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalenessPolicy {
    /// Compare source modification times.
    #[default]
    Timestamp,

    /// Compare digests of the source content.
    Hash,
}

impl StalenessPolicy {
    /// Pick the policy from the `hash` option.
    pub fn from_hash_flag(hash: bool) -> Self {
        if hash {
            StalenessPolicy::Hash
        } else {
            StalenessPolicy::Timestamp
        }
    }

    /// Capture the current token of the source at `path`.
    pub fn token(&self, path: &Path) -> Result<StalenessToken> {
        match self {
            StalenessPolicy::Timestamp => Ok(StalenessToken::Timestamp {
                timestamp: modified_millis(path)?,
            }),
            StalenessPolicy::Hash => Ok(StalenessToken::Hash {
                hash: content_digest(path)?,
            }),
        }
    }

    /// Whether `entry` still describes the source at `path`.
    ///
    /// An entry carrying the other policy's token is never valid.
    pub fn is_valid(&self, path: &Path, entry: &CacheEntry) -> Result<bool> {
        match (self, &entry.token) {
            (StalenessPolicy::Timestamp, StalenessToken::Timestamp { timestamp }) => {
                Ok(*timestamp >= modified_millis(path)?)
            }
            (StalenessPolicy::Hash, StalenessToken::Hash { hash }) => {
                Ok(*hash == content_digest(path)?)
            }
            _ => Ok(false),
        }
    }

    /// Look up `key` in `index`, returning the cached content if it is fresh.
    ///
    /// A stale entry is removed from the index before returning `None`, so
    /// the caller treats it exactly like a miss. Failing to stat or read the
    /// source is an error, not a miss.
    pub fn check(&self, index: &CacheIndex, key: &str) -> Result<Option<String>> {
        let Some(entry) = index.get(key) else {
            tracing::debug!(path = key, "not in cache");
            return Ok(None);
        };

        tracing::debug!(path = key, "found in cache");

        if self.is_valid(Path::new(key), &entry)? {
            tracing::info!(path = key, "is up to date in cache");
            Ok(Some(entry.content))
        } else {
            tracing::info!(path = key, "in cache, but stale, so purging");
            index.remove(key);
            Ok(None)
        }
    }

    /// Name used in listings and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StalenessPolicy::Timestamp => "timestamp",
            StalenessPolicy::Hash => "hash",
        }
    }
}

impl std::fmt::Display for StalenessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Modification time of `path` in epoch milliseconds.
pub fn modified_millis(path: &Path) -> Result<i64> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| CacheError::source_unavailable(path, e))?;
    Ok(DateTime::<Utc>::from(modified).timestamp_millis())
}

/// Hex SHA-256 digest of the bytes at `path`.
pub fn content_digest(path: &Path) -> Result<String> {
    let content = fs::read(path).map_err(|e| CacheError::source_unavailable(path, e))?;
    let digest = Sha256::digest(&content);
    Ok(hex::encode(&digest[..]))
}
