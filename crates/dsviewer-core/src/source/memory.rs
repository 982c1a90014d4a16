//! In-memory dataset source for tests and demos.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{BoxFuture, DatasetSource};
use crate::dataset::{Dataset, DatasetRef};
use crate::record::Record;
use crate::{CoreError, Result};

/// A fixed set of datasets held in memory.
///
/// Supports call counting via [`load_count()`](InMemorySource::load_count)
/// and [`splits_count()`](InMemorySource::splits_count).
#[derive(Default)]
pub struct InMemorySource {
    /// `(dataset name, splits in order)`.
    datasets: Vec<(String, Vec<(String, Arc<Dataset>)>)>,
    splits_calls: AtomicUsize,
    load_calls: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one split of a dataset. Splits keep insertion order.
    pub fn with_split(mut self, name: &str, split: &str, records: Vec<Record>) -> Self {
        let dataset = Arc::new(Dataset::new(DatasetRef::new(name, split), records));
        match self.datasets.iter_mut().find(|(n, _)| n == name) {
            Some((_, splits)) => splits.push((split.to_string(), dataset)),
            None => self
                .datasets
                .push((name.to_string(), vec![(split.to_string(), dataset)])),
        }
        self
    }

    pub fn load_count(&self) -> usize {
        self.load_calls.load(Ordering::Relaxed)
    }

    pub fn splits_count(&self) -> usize {
        self.splits_calls.load(Ordering::Relaxed)
    }

    fn find(&self, name: &str) -> Result<&[(String, Arc<Dataset>)]> {
        self.datasets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, splits)| splits.as_slice())
            .ok_or_else(|| CoreError::DatasetNotFound(name.to_string()))
    }
}

impl DatasetSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn splits<'a>(&'a self, dataset: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            self.splits_calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.find(dataset)?.iter().map(|(s, _)| s.clone()).collect())
        })
    }

    fn load<'a>(&'a self, dataset: &'a str, split: &'a str) -> BoxFuture<'a, Result<Arc<Dataset>>> {
        Box::pin(async move {
            self.load_calls.fetch_add(1, Ordering::Relaxed);
            self.find(dataset)?
                .iter()
                .find(|(s, _)| s == split)
                .map(|(_, ds)| Arc::clone(ds))
                .ok_or_else(|| CoreError::SplitNotFound {
                    name: dataset.to_string(),
                    split: split.to_string(),
                })
        })
    }
}
