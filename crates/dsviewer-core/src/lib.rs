use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub mod cache;
pub mod config_file;
pub mod conversation;
pub mod dataset;
pub mod files;
pub mod preview;
pub mod record;
pub mod session;
pub mod source;
pub mod wordcloud;

// Re-export for convenience
pub use cache::CachedSource;
pub use conversation::{Conversation, Message, RecordKey, Role, Selection};
pub use dataset::{Dataset, DatasetRef};
pub use files::{ImageListing, SUPPORTED_IMAGE_FORMATS, browse_images, list_files};
pub use record::{Answer, MultimodalRecord, QaRecord, Record, RecordView};
pub use session::{Block, Controls, Event, RenderPlan, Session};
pub use source::{DatasetSource, HubSource, InMemorySource, LocalSource};
pub use wordcloud::{WordCloud, WordCloudOptions};

/// Which family of dataset is being browsed. Decides how records are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DatasetKind {
    #[default]
    QuestionAnswering,
    Multimodal,
}

impl DatasetKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::QuestionAnswering => "Question-Answering",
            Self::Multimodal => "Multimodal",
        }
    }

    /// Dataset name pre-filled when switching to this kind.
    pub fn default_dataset(self) -> &'static str {
        match self {
            Self::QuestionAnswering => "squad",
            Self::Multimodal => "coco",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::QuestionAnswering => Self::Multimodal,
            Self::Multimodal => Self::QuestionAnswering,
        }
    }

    /// Parse a user-supplied kind name (`qa`, `question-answering`, `mm`, `multimodal`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qa" | "question-answering" | "question_answering" => Some(Self::QuestionAnswering),
            "mm" | "multimodal" => Some(Self::Multimodal),
            _ => None,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("dataset '{0}' not found")]
    DatasetNotFound(String),
    #[error("split '{split}' not found in dataset '{name}'")]
    SplitNotFound { name: String, split: String },
    #[error("dataset API error: {0}")]
    Api(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("config error: {0}")]
    Config(String),
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parse_accepts_short_and_long_names() {
        assert_eq!(DatasetKind::parse("qa"), Some(DatasetKind::QuestionAnswering));
        assert_eq!(
            DatasetKind::parse("Question-Answering"),
            Some(DatasetKind::QuestionAnswering)
        );
        assert_eq!(DatasetKind::parse("MM"), Some(DatasetKind::Multimodal));
        assert_eq!(DatasetKind::parse("audio"), None);
    }

    #[test]
    fn kind_defaults_match_labels() {
        assert_eq!(DatasetKind::QuestionAnswering.default_dataset(), "squad");
        assert_eq!(DatasetKind::Multimodal.default_dataset(), "coco");
        assert_eq!(DatasetKind::Multimodal.next(), DatasetKind::QuestionAnswering);
    }
}
