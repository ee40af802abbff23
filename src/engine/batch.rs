//! Parallel batch transforms.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

use rayon::prelude::*;
use rayon::ThreadPool;

use super::TransformCache;
use crate::error::{CacheError, Result};
use crate::file::SourceFile;
use crate::glob::{resolve, GlobOptions};

/// Result of transforming one path in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The path that was transformed.
    pub path: PathBuf,

    /// The produced file, or the error for this path alone.
    pub result: Result<SourceFile>,
}

impl BatchOutcome {
    /// Whether this path was transformed successfully.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The produced file, if any.
    pub fn file(&self) -> Option<&SourceFile> {
        self.result.as_ref().ok()
    }

    /// The error, if any.
    pub fn error(&self) -> Option<&CacheError> {
        self.result.as_ref().err()
    }
}

/// Success and failure counts of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Count the outcomes of a batch.
    pub fn of(outcomes: &[BatchOutcome]) -> Self {
        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        Self {
            succeeded: outcomes.len() - failed,
            failed,
        }
    }

    /// Total number of paths.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl TransformCache {
    /// Transform every file matching `pattern` in parallel.
    ///
    /// Pattern errors fail the whole call before anything runs. After that,
    /// each path gets exactly one outcome; a failing path never stops the
    /// others.
    pub fn transform_glob(&self, pattern: &str, options: &GlobOptions) -> Result<Vec<BatchOutcome>> {
        let paths = resolve(pattern, options)?;
        tracing::debug!(pattern, files = paths.len(), "transforming glob");
        Ok(self.transform_paths(paths))
    }

    /// Transform `paths` in parallel, returning outcomes in input order.
    ///
    /// Every path is queued at once on a worker pool sized by the cache's
    /// concurrency cap, or by the available parallelism when there is none.
    pub fn transform_paths<I, P>(&self, paths: I) -> Vec<BatchOutcome>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        if paths.is_empty() {
            return Vec::new();
        }

        let workers = self
            .max_concurrency
            .unwrap_or_else(default_workers)
            .min(paths.len());

        let run = |path: &PathBuf| {
            let result = self.transform(path);
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), error = %e, "transform failed");
            }
            BatchOutcome {
                path: path.clone(),
                result,
            }
        };

        match build_pool(workers) {
            BatchPool::Rayon(pool) => pool.install(|| paths.par_iter().map(run).collect()),
            BatchPool::Inline => paths.iter().map(run).collect(),
        }
    }
}

enum BatchPool {
    Rayon(ThreadPool),
    Inline,
}

fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

fn build_pool(threads: usize) -> BatchPool {
    // Thread creation can fail under tight process or memory limits. Shrink
    // the pool instead of failing the batch.
    let mut threads = threads.max(1);
    loop {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("ftcache-batch-{idx}"))
            .build()
        {
            Ok(pool) => return BatchPool::Rayon(pool),
            Err(e) if threads > 1 => {
                tracing::warn!(threads, error = %e, "could not start batch workers, retrying with fewer");
                threads = (threads / 2).max(1);
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not start batch workers, running inline");
                return BatchPool::Inline;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CacheOptions;
    use crate::pipeline::{step_fn, StepRef};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn bracket() -> StepRef {
        step_fn("bracket", |mut file: SourceFile| {
            if file.contents_lossy().contains("fail") {
                anyhow::bail!("refusing {}", file.path().display());
            }
            let wrapped = format!("[{}]", file.contents_lossy());
            file.set_contents(wrapped);
            Ok(file)
        })
    }

    fn fixture(count: usize, failing: &[usize]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for i in 0..count {
            let content = if failing.contains(&i) { "fail" } else { "ok" };
            fs::write(temp.path().join(format!("f{:02}.json", i)), content).unwrap();
        }
        temp
    }

    #[test]
    fn glob_yields_one_outcome_per_path() {
        let temp = fixture(6, &[1, 4]);
        let cache = TransformCache::new(
            CacheOptions::new(temp.path().join(".cache")).with_transform(bracket()),
        )
        .unwrap();

        let outcomes = cache
            .transform_glob("*.json", &GlobOptions::default().with_cwd(temp.path()))
            .unwrap();

        assert_eq!(outcomes.len(), 6);
        let summary = BatchSummary::of(&outcomes);
        assert_eq!(summary, BatchSummary { succeeded: 4, failed: 2 });
        assert_eq!(summary.total(), 6);
        assert!(outcomes[1].error().is_some());
        assert_eq!(outcomes[0].file().unwrap().contents_lossy(), "[ok]");
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn outcomes_follow_input_order() {
        let temp = fixture(5, &[]);
        let cache = TransformCache::new(
            CacheOptions::new(temp.path().join(".cache"))
                .with_transform(bracket())
                .with_max_concurrency(2),
        )
        .unwrap();

        let paths: Vec<PathBuf> = (0..5)
            .rev()
            .map(|i| temp.path().join(format!("f{:02}.json", i)))
            .collect();
        let outcomes = cache.transform_paths(&paths);

        let order: Vec<PathBuf> = outcomes.iter().map(|o| o.path.clone()).collect();
        assert_eq!(order, paths);
    }

    #[test]
    fn batch_runs_in_parallel() {
        let temp = fixture(4, &[]);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));
        let slow = step_fn("slow", move |file: SourceFile| {
            let now = a.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            a.fetch_sub(1, Ordering::SeqCst);
            Ok(file)
        });
        let cache = TransformCache::new(
            CacheOptions::new(temp.path().join(".cache"))
                .with_transform(slow)
                .with_max_concurrency(4),
        )
        .unwrap();

        let outcomes = cache
            .transform_glob("*.json", &GlobOptions::default().with_cwd(temp.path()))
            .unwrap();

        assert_eq!(outcomes.len(), 4);
        assert!(peak.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn concurrency_cap_is_respected() {
        let temp = fixture(6, &[]);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));
        let slow = step_fn("slow", move |file: SourceFile| {
            let now = a.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            a.fetch_sub(1, Ordering::SeqCst);
            Ok(file)
        });
        let cache = TransformCache::new(
            CacheOptions::new(temp.path().join(".cache"))
                .with_transform(slow)
                .with_max_concurrency(2),
        )
        .unwrap();

        let outcomes = cache
            .transform_glob("*.json", &GlobOptions::default().with_cwd(temp.path()))
            .unwrap();

        assert_eq!(outcomes.len(), 6);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn batch_larger_than_pool_gets_every_outcome() {
        let temp = fixture(60, &[7, 31]);
        let cache = TransformCache::new(
            CacheOptions::new(temp.path().join(".cache"))
                .with_transform(bracket())
                .with_max_concurrency(3),
        )
        .unwrap();

        let outcomes = cache
            .transform_glob("*.json", &GlobOptions::default().with_cwd(temp.path()))
            .unwrap();

        assert_eq!(outcomes.len(), 60);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.path, temp.path().join(format!("f{:02}.json", i)));
        }
        assert_eq!(BatchSummary::of(&outcomes).failed, 2);
        assert_eq!(cache.len(), 58);
    }

    #[test]
    fn pool_of_one_still_builds() {
        assert!(matches!(build_pool(0), BatchPool::Rayon(_)));
        assert!(matches!(build_pool(1), BatchPool::Rayon(_)));
    }

    #[test]
    fn missing_path_is_individual_error() {
        let temp = fixture(2, &[]);
        let cache = TransformCache::new(
            CacheOptions::new(temp.path().join(".cache")).with_transform(bracket()),
        )
        .unwrap();

        let outcomes = cache.transform_paths([
            temp.path().join("f00.json"),
            temp.path().join("missing.json"),
            temp.path().join("f01.json"),
        ]);

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert!(matches!(
            outcomes[1].error(),
            Some(CacheError::SourceUnavailable { .. })
        ));
        assert!(outcomes[2].is_ok());
    }

    #[test]
    fn invalid_pattern_fails_whole_batch() {
        let temp = fixture(1, &[]);
        let cache = TransformCache::new(CacheOptions::new(temp.path().join(".cache"))).unwrap();

        let result = cache.transform_glob("[", &GlobOptions::default().with_cwd(temp.path()));
        assert!(matches!(result, Err(CacheError::InvalidPattern { .. })));
    }

    #[test]
    fn empty_match_returns_empty() {
        let temp = fixture(0, &[]);
        let cache = TransformCache::new(CacheOptions::new(temp.path().join(".cache"))).unwrap();

        let outcomes = cache
            .transform_glob("*.json", &GlobOptions::default().with_cwd(temp.path()))
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
