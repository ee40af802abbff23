//! Transform output caching.
//!
//! This module provides the disk-mirrored index of transform outputs and
//! the timestamp- and content-based staleness checks that guard it.

pub mod entry;
pub mod index;
pub mod staleness;

pub use entry::{CacheEntry, StalenessToken};
pub use index::{CacheIndex, KeyGuard};
pub use staleness::{content_digest, modified_millis, StalenessPolicy};

/// Default cache file name, relative to the project root.
pub const DEFAULT_CACHE_FILE: &str = ".ftcache.json";

/// Cache key for a source path.
pub fn cache_key(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}
