//! Dataset source trait and implementations for resolving datasets by name.

pub mod hub;
pub mod local;
pub mod memory;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

pub use hub::HubSource;
pub use local::LocalSource;
pub use memory::InMemorySource;

use crate::cache::CachedSource;
use crate::dataset::Dataset;
use crate::{CoreError, Result};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can list the splits of a dataset and load one split.
pub trait DatasetSource: Send + Sync {
    /// Short name of this source (e.g. "hub", "local").
    fn name(&self) -> &str;

    /// Available split names for `dataset`, in display order.
    fn splits<'a>(&'a self, dataset: &'a str) -> BoxFuture<'a, Result<Vec<String>>>;

    /// Load all records of one split.
    fn load<'a>(&'a self, dataset: &'a str, split: &'a str) -> BoxFuture<'a, Result<Arc<Dataset>>>;

    /// Forget anything memoized so the next call goes back to the backend.
    fn invalidate(&self) {}
}

/// Which source backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Hub,
    Local,
}

impl SourceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hub" | "huggingface" | "hf" => Some(Self::Hub),
            "local" | "dir" | "files" => Some(Self::Local),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hub => "hub",
            Self::Local => "local",
        }
    }
}

/// Resolved settings for building a source.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub local_root: Option<PathBuf>,
    pub endpoint: String,
    pub config_name: Option<String>,
    pub max_rows: usize,
    pub timeout: Duration,
    pub hf_token: Option<String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Hub,
            local_root: None,
            endpoint: hub::DEFAULT_ENDPOINT.to_string(),
            config_name: None,
            max_rows: hub::DEFAULT_MAX_ROWS,
            timeout: Duration::from_secs(30),
            hf_token: None,
        }
    }
}

/// Build the configured source, wrapped in a memoizing cache.
pub fn build_source(settings: &SourceSettings) -> Result<Arc<dyn DatasetSource>> {
    match settings.kind {
        SourceKind::Hub => {
            let hub = HubSource::new(settings)?;
            Ok(Arc::new(CachedSource::new(hub)))
        }
        SourceKind::Local => {
            let root = settings.local_root.clone().ok_or_else(|| {
                CoreError::Config("local source selected but no local_root configured".into())
            })?;
            Ok(Arc::new(CachedSource::new(LocalSource::new(root))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_parse() {
        assert_eq!(SourceKind::parse("HF"), Some(SourceKind::Hub));
        assert_eq!(SourceKind::parse("local"), Some(SourceKind::Local));
        assert_eq!(SourceKind::parse("s3"), None);
    }

    #[test]
    fn local_source_requires_root() {
        let settings = SourceSettings {
            kind: SourceKind::Local,
            ..SourceSettings::default()
        };
        let err = build_source(&settings).err().unwrap();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn builds_local_source() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SourceSettings {
            kind: SourceKind::Local,
            local_root: Some(dir.path().to_path_buf()),
            ..SourceSettings::default()
        };
        let source = build_source(&settings).unwrap();
        assert_eq!(source.name(), "local");
    }
}
