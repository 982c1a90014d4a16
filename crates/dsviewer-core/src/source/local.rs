//! Datasets stored on disk as `<root>/<name>/<split>.jsonl` or `<split>.json`.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::{BoxFuture, DatasetSource};
use crate::dataset::{Dataset, DatasetRef};
use crate::record::Record;
use crate::{CoreError, Result};

/// Splits listed before all others, in this order.
const PREFERRED_SPLITS: &[&str] = &["train", "validation", "test"];

pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dataset_dir(&self, dataset: &str) -> Result<PathBuf> {
        if !is_relative_name(dataset) {
            return Err(CoreError::DatasetNotFound(dataset.to_string()));
        }
        let dir = self.root.join(dataset);
        if !dir.is_dir() {
            return Err(CoreError::DatasetNotFound(dataset.to_string()));
        }
        Ok(dir)
    }

    fn list_splits(&self, dataset: &str) -> Result<Vec<String>> {
        let dir = self.dataset_dir(dataset)?;
        let read_dir = std::fs::read_dir(&dir).map_err(|e| CoreError::io(&dir, e))?;

        let mut splits: Vec<String> = Vec::new();
        for entry in read_dir.flatten() {
            let path = entry.path();
            if !path.is_file() || split_format(&path).is_none() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && !splits.iter().any(|s| s == stem)
            {
                splits.push(stem.to_string());
            }
        }

        if splits.is_empty() {
            return Err(CoreError::DatasetNotFound(dataset.to_string()));
        }
        splits.sort_by_key(|s| {
            let rank = PREFERRED_SPLITS
                .iter()
                .position(|p| p == s)
                .unwrap_or(PREFERRED_SPLITS.len());
            (rank, s.clone())
        });
        Ok(splits)
    }

    fn read_split(&self, dataset: &str, split: &str) -> Result<Dataset> {
        let dir = self.dataset_dir(dataset)?;
        let not_found = || CoreError::SplitNotFound {
            name: dataset.to_string(),
            split: split.to_string(),
        };
        // a split is a single file name inside the dataset directory
        if !is_relative_name(split) || Path::new(split).components().count() != 1 {
            return Err(not_found());
        }
        let path = ["jsonl", "json"]
            .iter()
            .map(|ext| dir.join(format!("{split}.{ext}")))
            .find(|p| p.is_file())
            .ok_or_else(not_found)?;

        let content = std::fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
        let records = match split_format(&path) {
            Some(SplitFormat::JsonLines) => parse_jsonl(&content)?,
            _ => parse_json(&content)?,
        };

        Ok(Dataset::new(DatasetRef::new(dataset, split), records))
    }
}

impl DatasetSource for LocalSource {
    fn name(&self) -> &str {
        "local"
    }

    fn splits<'a>(&'a self, dataset: &'a str) -> BoxFuture<'a, Result<Vec<String>>> {
        Box::pin(async move { self.list_splits(dataset) })
    }

    fn load<'a>(&'a self, dataset: &'a str, split: &'a str) -> BoxFuture<'a, Result<Arc<Dataset>>> {
        Box::pin(async move {
            let ds = self.read_split(dataset, split)?;
            tracing::info!(
                "loaded {} ({} rows) from {}",
                ds.reference,
                ds.len(),
                self.root.display()
            );
            Ok(Arc::new(ds))
        })
    }
}

/// Non-empty and made only of plain path components (no `..`, no root).
fn is_relative_name(name: &str) -> bool {
    !name.trim().is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitFormat {
    Json,
    JsonLines,
}

fn split_format(path: &Path) -> Option<SplitFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("jsonl") => Some(SplitFormat::JsonLines),
        Some("json") => Some(SplitFormat::Json),
        _ => None,
    }
}

fn parse_jsonl(content: &str) -> Result<Vec<Record>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let value: Value = serde_json::from_str(line)?;
            Record::from_value(value)
                .map_err(|e| CoreError::InvalidRecord(format!("line {}: {}", i + 1, e)))
        })
        .collect()
}

/// A JSON array of objects, or an object with a `data` array (SQuAD-style
/// exports, `{"data": [...]}`).
fn parse_json(content: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(content)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CoreError::InvalidRecord(
                    "JSON object without a 'data' array".into(),
                ));
            }
        },
        _ => {
            return Err(CoreError::InvalidRecord(
                "expected a JSON array of records".into(),
            ));
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            Record::from_value(item)
                .map_err(|e| CoreError::InvalidRecord(format!("item {}: {}", i, e)))
        })
        .collect()
}
