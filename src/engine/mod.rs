//! The transform cache engine.
//!
//! [`TransformCache`] ties the pieces together: it resolves the cache key
//! of a file, asks the [`StalenessPolicy`] whether the cached output is
//! still valid, and otherwise runs the [`Pipeline`] and records the result.
//!
//! # Example
//!
//! ```no_run
//! use file_transform_cache::engine::{CacheOptions, TransformCache};
//! use file_transform_cache::pipeline::builtin::Wrap;
//! use std::sync::Arc;
//!
//! let options = CacheOptions::new(".ftcache.json").with_transform(Arc::new(Wrap::new("[", "]")));
//! let cache = TransformCache::new(options).unwrap();
//!
//! let out = cache.transform("hello.txt").unwrap();
//! println!("{}", out.contents_lossy());
//!
//! // Nothing is written until save() is called.
//! cache.save().unwrap();
//! ```

mod batch;

pub use batch::{BatchOutcome, BatchSummary};

use std::path::{Path, PathBuf};

use crate::cache::{cache_key, CacheEntry, CacheIndex, StalenessPolicy};
use crate::error::Result;
use crate::file::{SourceFile, TransformInput};
use crate::pipeline::{Pipeline, StepRef};

/// Construction options for [`TransformCache`].
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Where the index is read from and saved to.
    pub path: PathBuf,

    /// Steps applied on a miss, in order.
    pub transforms: Pipeline,

    /// Use content hashes instead of modification times.
    pub hash: bool,

    /// Advisory log level for the binary's subscriber.
    pub logging_level: String,

    /// Upper bound on parallel workers in batch runs. `None` sizes the
    /// pool by the available parallelism.
    pub max_concurrency: Option<usize>,
}

impl CacheOptions {
    /// Default advisory log level.
    pub const DEFAULT_LOGGING_LEVEL: &'static str = "warn";

    /// Options for a cache stored at `path` with no steps.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            transforms: Pipeline::identity(),
            hash: false,
            logging_level: Self::DEFAULT_LOGGING_LEVEL.to_string(),
            max_concurrency: None,
        }
    }

    /// Use `steps` as the pipeline.
    pub fn with_transforms(mut self, steps: impl Into<Pipeline>) -> Self {
        self.transforms = steps.into();
        self
    }

    /// Use a single step as the pipeline.
    pub fn with_transform(self, step: StepRef) -> Self {
        self.with_transforms(step)
    }

    /// Select hash-based staleness checks.
    pub fn with_hash(mut self, hash: bool) -> Self {
        self.hash = hash;
        self
    }

    /// Set the advisory log level.
    pub fn with_logging_level(mut self, level: impl Into<String>) -> Self {
        self.logging_level = level.into();
        self
    }

    /// Cap batch parallelism.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = Some(max.max(1));
        self
    }
}

/// A staleness-aware cache of pipeline outputs.
///
/// Safe to share between threads; every method takes `&self`.
#[derive(Debug)]
pub struct TransformCache {
    index: CacheIndex,
    pipeline: Pipeline,
    policy: StalenessPolicy,
    max_concurrency: Option<usize>,
    logging_level: String,
}

impl TransformCache {
    /// Create a cache, loading the index file or creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns `IndexLoad`/`IndexParse` if an existing index cannot be read,
    /// and `IndexSave` if a new one cannot be created.
    pub fn new(options: CacheOptions) -> Result<Self> {
        let index = CacheIndex::open(&options.path)?;
        let policy = StalenessPolicy::from_hash_flag(options.hash);

        tracing::debug!(
            path = %options.path.display(),
            policy = %policy,
            steps = options.transforms.len(),
            entries = index.len(),
            "opened transform cache"
        );

        Ok(Self {
            index,
            pipeline: options.transforms,
            policy,
            max_concurrency: options.max_concurrency,
            logging_level: options.logging_level,
        })
    }

    /// Transform a path or file, serving the cached output when it is fresh.
    ///
    /// On a hit no step runs and the returned file carries the request's
    /// path. On a miss the pipeline runs and, if it succeeds, its output is
    /// recorded under the original source path. Failures leave the index
    /// as it was.
    pub fn transform(&self, input: impl Into<TransformInput>) -> Result<SourceFile> {
        let mut file = input.into().into_file()?;
        let key = cache_key(source_path(&file));

        let _guard = self.index.lock_key(&key);

        if let Some(content) = self.policy.check(&self.index, &key)? {
            tracing::info!(path = %file.path().display(), "serving cached transform");
            file.set_contents(content.into_bytes());
            return Ok(file);
        }

        tracing::debug!(path = %file.path().display(), "cache miss, running pipeline");
        let output = self.pipeline.run(file)?;

        let token = self.policy.token(Path::new(&key))?;
        let content = output.contents_lossy();
        self.index.insert(CacheEntry::new(key.as_str(), content, token));
        tracing::info!(path = %key, "stored transform output");

        Ok(output)
    }

    /// Write the index to disk if it changed.
    ///
    /// This is the only way the cache is persisted. Returns whether a write
    /// happened.
    pub fn save(&self) -> Result<bool> {
        self.index.save()
    }

    /// Whether the in-memory index differs from the saved one.
    pub fn is_dirty(&self) -> bool {
        self.index.is_dirty()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The cached entry for a source path, fresh or not.
    pub fn entry(&self, source: impl AsRef<Path>) -> Option<CacheEntry> {
        self.index.get(&cache_key(source.as_ref()))
    }

    /// Snapshot of all cached entries.
    pub fn entries(&self) -> Vec<CacheEntry> {
        self.index.entries()
    }

    /// The staleness policy in use.
    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    /// Path of the index file.
    pub fn path(&self) -> &Path {
        self.index.path()
    }

    /// The configured pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Advisory log level this cache was configured with.
    pub fn logging_level(&self) -> &str {
        &self.logging_level
    }
}

/// The path a file is cached under.
///
/// A file that has already been renamed by a step is keyed by the first
/// path in its history, so rewrites never change the key.
fn source_path(file: &SourceFile) -> &Path {
    if file.history().len() > 1 {
        file.original_path()
    } else {
        file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StalenessToken;
    use crate::error::CacheError;
    use crate::pipeline::builtin::{SetExtension, Wrap};
    use crate::pipeline::step_fn;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn counting_wrap(runs: &Arc<AtomicUsize>) -> StepRef {
        let runs = Arc::clone(runs);
        step_fn("bracket", move |mut file: SourceFile| {
            runs.fetch_add(1, Ordering::SeqCst);
            let wrapped = format!("[{}]", file.contents_lossy());
            file.set_contents(wrapped);
            Ok(file)
        })
    }

    fn cache_with(temp: &TempDir, step: StepRef, hash: bool) -> TransformCache {
        let options = CacheOptions::new(temp.path().join(".sample"))
            .with_transform(step)
            .with_hash(hash);
        TransformCache::new(options).unwrap()
    }

    #[test]
    fn options_defaults() {
        let options = CacheOptions::new("cache.json");
        assert!(!options.hash);
        assert!(options.transforms.is_empty());
        assert_eq!(options.logging_level, "warn");
        assert!(options.max_concurrency.is_none());
    }

    #[test]
    fn max_concurrency_is_at_least_one() {
        let options = CacheOptions::new("cache.json").with_max_concurrency(0);
        assert_eq!(options.max_concurrency, Some(1));
    }

    #[test]
    fn new_creates_cache_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".sample");

        let cache = TransformCache::new(CacheOptions::new(&path)).unwrap();
        assert!(path.is_file());
        assert!(!cache.is_dirty());
        assert_eq!(cache.policy(), StalenessPolicy::Timestamp);
    }

    #[test]
    fn miss_then_hit() {
        let temp = TempDir::new().unwrap();
        let hello = temp.path().join("hello");
        fs::write(&hello, "hello").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let cache = cache_with(&temp, counting_wrap(&runs), false);

        let first = cache.transform(&hello).unwrap();
        assert_eq!(first.contents_lossy(), "[hello]");
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        let second = cache.transform(&hello).unwrap();
        assert_eq!(second.contents_lossy(), "[hello]");
        assert_eq!(second.path(), hello.as_path());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn modified_source_reruns_pipeline() {
        let temp = TempDir::new().unwrap();
        let hello = temp.path().join("hello");
        fs::write(&hello, "hello").unwrap();
        set_file_mtime(&hello, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let cache = cache_with(&temp, counting_wrap(&runs), false);

        cache.transform(&hello).unwrap();

        fs::write(&hello, "howdy").unwrap();
        set_file_mtime(&hello, FileTime::from_unix_time(1_600_000_010, 0)).unwrap();

        let out = cache.transform(&hello).unwrap();
        assert_eq!(out.contents_lossy(), "[howdy]");
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(cache.entry(&hello).unwrap().content, "[howdy]");
    }

    #[test]
    fn hash_policy_ignores_touch() {
        let temp = TempDir::new().unwrap();
        let hello = temp.path().join("hello");
        fs::write(&hello, "hello").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let cache = cache_with(&temp, counting_wrap(&runs), true);

        cache.transform(&hello).unwrap();
        fs::write(&hello, "hello").unwrap();
        set_file_mtime(&hello, FileTime::from_unix_time(2_000_000_000, 0)).unwrap();

        let out = cache.transform(&hello).unwrap();
        assert_eq!(out.contents_lossy(), "[hello]");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(matches!(
            cache.entry(&hello).unwrap().token,
            StalenessToken::Hash { .. }
        ));
    }

    #[test]
    fn key_survives_extension_rewrite() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("sometext.txt");
        fs::write(&source, "sometext").unwrap();
        let options = CacheOptions::new(temp.path().join(".sample"))
            .with_transforms(vec![
                Arc::new(Wrap::new("[", "]")) as StepRef,
                Arc::new(SetExtension::new(".dat")) as StepRef,
            ])
            .with_hash(true);
        let cache = TransformCache::new(options).unwrap();

        let out = cache.transform(&source).unwrap();
        assert_eq!(out.path(), temp.path().join("sometext.dat"));
        assert!(cache.entry(&source).is_some());
        assert!(cache.entry(temp.path().join("sometext.dat")).is_none());
    }

    #[test]
    fn renamed_file_handle_uses_original_key() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "a").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let cache = cache_with(&temp, counting_wrap(&runs), true);

        cache.transform(&source).unwrap();

        let mut renamed = SourceFile::new(&source, "a");
        renamed.set_extension("dat");
        let out = cache.transform(renamed).unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(out.path(), temp.path().join("a.dat"));
        assert_eq!(out.contents_lossy(), "[a]");
    }

    #[test]
    fn concurrent_transforms_of_one_path_run_pipeline_once() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("shared.txt");
        fs::write(&source, "shared").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let slow = step_fn("slow", move |mut file: SourceFile| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(30));
            let wrapped = format!("[{}]", file.contents_lossy());
            file.set_contents(wrapped);
            Ok(file)
        });
        let cache = cache_with(&temp, slow, false);

        let outputs: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..6)
                .map(|_| s.spawn(|| cache.transform(&source).unwrap().contents_lossy()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(outputs.iter().all(|out| out == "[shared]"));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failure_leaves_index_untouched() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "a").unwrap();
        let cache = cache_with(&temp, step_fn("broken", |_f| anyhow::bail!("nope")), false);

        let err = cache.transform(&source).unwrap_err();
        assert!(matches!(err, CacheError::StepFailed { .. }));
        assert!(cache.is_empty());
        assert!(!cache.is_dirty());
    }

    #[test]
    fn streaming_input_is_rejected() {
        let temp = TempDir::new().unwrap();
        let cache = TransformCache::new(CacheOptions::new(temp.path().join(".sample"))).unwrap();

        let file = SourceFile::streaming(temp.path().join("x"), std::io::empty());
        let result = cache.transform(file);
        assert!(matches!(result, Err(CacheError::UnsupportedFileKind { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn empty_path_is_invalid_input() {
        let temp = TempDir::new().unwrap();
        let cache = TransformCache::new(CacheOptions::new(temp.path().join(".sample"))).unwrap();

        let result = cache.transform("");
        assert!(matches!(result, Err(CacheError::InvalidInput { .. })));
        assert!(!cache.is_dirty());
    }

    #[test]
    fn deleted_source_with_entry_is_error() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "a").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let cache = cache_with(&temp, counting_wrap(&runs), false);
        cache.transform(&source).unwrap();

        fs::remove_file(&source).unwrap();
        let result = cache.transform(SourceFile::new(&source, "a"));
        assert!(matches!(result, Err(CacheError::SourceUnavailable { .. })));
    }

    #[test]
    fn zero_steps_caches_input() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "plain").unwrap();
        let cache = TransformCache::new(CacheOptions::new(temp.path().join(".sample"))).unwrap();

        let out = cache.transform(&source).unwrap();
        assert_eq!(out.contents_lossy(), "plain");
        assert_eq!(cache.entry(&source).unwrap().content, "plain");
    }

    #[test]
    fn save_persists_and_reload_hits() {
        let temp = TempDir::new().unwrap();
        let hello = temp.path().join("hello");
        fs::write(&hello, "greetings").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));

        {
            let cache = cache_with(&temp, counting_wrap(&runs), false);
            cache.transform(&hello).unwrap();
            assert!(cache.is_dirty());
            assert!(cache.save().unwrap());
            assert!(!cache.is_dirty());
            assert!(!cache.save().unwrap());
        }

        let cache = cache_with(&temp, counting_wrap(&runs), false);
        let out = cache.transform(&hello).unwrap();
        assert_eq!(out.contents_lossy(), "[greetings]");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
