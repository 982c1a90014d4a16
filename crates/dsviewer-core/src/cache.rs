//! Memoizing wrapper around a [`DatasetSource`].
//!
//! Split listings and loaded splits are kept in [`DashMap`]s keyed by dataset
//! name (and split). Only successful results are cached; errors are returned
//! to the caller and retried on the next interaction.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::Result;
use crate::dataset::Dataset;
use crate::source::{BoxFuture, DatasetSource};

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
struct SplitKey {
    dataset: String,
    split: String,
}

pub struct CachedSource<S> {
    inner: S,
    splits: DashMap<String, Vec<String>>,
    datasets: DashMap<SplitKey, Arc<Dataset>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: DatasetSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            splits: DashMap::new(),
            datasets: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of splits currently held.
    pub fn cached_splits(&self) -> usize {
        self.datasets.len()
    }

    /// Drop everything cached so far.
    pub fn clear(&self) {
        tracing::debug!(splits = self.datasets.len(), "clearing dataset cache");
        self.splits.clear();
        self.datasets.clear();
    }
}

impl<S: DatasetSource> DatasetSource for CachedSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn splits<'a>(&'a self, dataset: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            if let Some(hit) = self.splits.get(dataset) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(hit.value().clone());
            }
            self.misses.fetch_add(1, Ordering::Relaxed);
            let splits = self.inner.splits(dataset).await?;
            self.splits.insert(dataset.to_string(), splits.clone());
            Ok(splits)
        })
    }

    fn load<'a>(&'a self, dataset: &'a str, split: &'a str) -> BoxFuture<'a, Result<Arc<Dataset>>> {
        Box::pin(async move {
            let key = SplitKey {
                dataset: dataset.to_string(),
                split: split.to_string(),
            };
            if let Some(hit) = self.datasets.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("cache hit for {}[{}]", dataset, split);
                return Ok(Arc::clone(hit.value()));
            }
            self.misses.fetch_add(1, Ordering::Relaxed);
            let loaded = self.inner.load(dataset, split).await?;
            self.datasets.insert(key, Arc::clone(&loaded));
            Ok(loaded)
        })
    }

    fn invalidate(&self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::source::InMemorySource;
    use serde_json::json;

    fn source() -> CachedSource<InMemorySource> {
        let rec = Record::from_value(json!({"context": "c"})).unwrap();
        CachedSource::new(
            InMemorySource::new()
                .with_split("qa", "train", vec![rec.clone()])
                .with_split("qa", "test", vec![rec]),
        )
    }

    #[tokio::test]
    async fn loads_each_split_once() {
        let cached = source();
        for _ in 0..3 {
            cached.load("qa", "train").await.unwrap();
        }
        cached.load("qa", "test").await.unwrap();

        assert_eq!(cached.inner.load_count(), 2);
        assert_eq!(cached.hits(), 2);
        assert_eq!(cached.misses(), 2);
        assert_eq!(cached.cached_splits(), 2);
    }

    #[tokio::test]
    async fn split_listing_is_memoized() {
        let cached = source();
        cached.splits("qa").await.unwrap();
        cached.splits("qa").await.unwrap();
        assert_eq!(cached.inner.splits_count(), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cached = source();
        assert!(cached.load("missing", "train").await.is_err());
        assert!(cached.load("missing", "train").await.is_err());
        assert_eq!(cached.inner.load_count(), 2);
        assert_eq!(cached.cached_splits(), 0);
    }

    #[tokio::test]
    async fn clear_forces_reload() {
        let cached = source();
        cached.load("qa", "train").await.unwrap();
        cached.clear();
        cached.load("qa", "train").await.unwrap();
        assert_eq!(cached.inner.load_count(), 2);
    }

    #[tokio::test]
    async fn invalidate_through_trait_object_drops_splits_too() {
        let cached = source();
        let dyn_source: &dyn DatasetSource = &cached;
        dyn_source.splits("qa").await.unwrap();
        dyn_source.load("qa", "train").await.unwrap();

        dyn_source.invalidate();
        assert_eq!(cached.cached_splits(), 0);

        dyn_source.splits("qa").await.unwrap();
        dyn_source.load("qa", "train").await.unwrap();
        assert_eq!(cached.inner.splits_count(), 2);
        assert_eq!(cached.inner.load_count(), 2);
    }
}
