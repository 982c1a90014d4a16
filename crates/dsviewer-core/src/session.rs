//! Per-session state and the render pass.
//!
//! A [`Session`] receives one [`Event`] per user interaction, updates its
//! state, and re-runs the whole render pass against a [`DatasetSource`],
//! producing a [`RenderPlan`]: the sidebar [`Controls`] plus an ordered list
//! of content [`Block`]s. Front ends only draw plans.

use std::path::{Path, PathBuf};

use crate::config_file::Settings;
use crate::conversation::{Message, RecordKey, Selection};
use crate::dataset::Dataset;
use crate::files::{ImageListing, browse_images};
use crate::record::{MultimodalRecord, NO_ANSWER_PLACEHOLDER, QaRecord, RecordView};
use crate::source::DatasetSource;
use crate::wordcloud::{WordCloud, WordCloudOptions};
use crate::{CoreError, DatasetKind};

pub const TITLE: &str = "Huggingface Dataset Viewer";

pub const EMPTY_SPLIT_WARNING: &str = "This split contains no records.";
pub const EMPTY_CORPUS_WARNING: &str = "No context text in this split; nothing to draw.";

/// One user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Re-render without changing anything.
    Refresh,
    /// Drop the source's cached splits, then re-render.
    Reload,
    /// Switch dataset kind. Resets the name to the kind's default.
    SetKind(DatasetKind),
    /// Change the dataset name. Clears the selected split.
    SetName(String),
    SetSplit(String),
    SetIndex(usize),
    SetWordCloud(bool),
    SetImageFolder(String),
    SetImageIndex(usize),
}

/// One piece of rendered content, in display order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Error(String),
    Warning(String),
    DatasetSize { len: usize, total_rows: usize },
    Keys(Vec<String>),
    Context(String),
    /// Already numbered (`"1. Paris"`).
    Options(Vec<String>),
    Chat(Message),
    WordCloud(WordCloud),
    Fields(MultimodalRecord),
    /// Chosen image of the browsed folder.
    Image { path: PathBuf, name: String },
}

/// State of the sidebar controls after a render pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Controls {
    pub kind: DatasetKind,
    pub name: String,
    pub splits: Vec<String>,
    pub split: Option<String>,
    pub index: usize,
    /// Highest selectable index; `None` until a non-empty split is loaded.
    pub max_index: Option<usize>,
    pub wordcloud_available: bool,
    pub wordcloud: bool,
    pub image_folder_available: bool,
    pub image_folder: String,
    pub images: Vec<String>,
    pub image_index: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderPlan {
    pub controls: Controls,
    pub blocks: Vec<Block>,
}

impl RenderPlan {
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Error(msg) => Some(msg.as_str()),
            _ => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Warning(msg) => Some(msg.as_str()),
            _ => None,
        })
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Chat(m) => Some(m),
            _ => None,
        })
    }

    pub fn wordcloud(&self) -> Option<&WordCloud> {
        self.blocks.iter().find_map(|b| match b {
            Block::WordCloud(wc) => Some(wc),
            _ => None,
        })
    }

    pub fn has_error(&self) -> bool {
        self.errors().next().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    kind: DatasetKind,
    name: String,
    split: Option<String>,
    index: usize,
    show_wordcloud: bool,
    image_folder: String,
    image_index: usize,
    reload: bool,
    selection: Selection,
    qa_dataset: String,
    multimodal_dataset: String,
    wordcloud_options: WordCloudOptions,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            kind: DatasetKind::QuestionAnswering,
            name: settings.qa_dataset.clone(),
            split: None,
            index: 0,
            show_wordcloud: false,
            image_folder: settings.image_folder.clone(),
            image_index: 0,
            reload: false,
            selection: Selection::default(),
            qa_dataset: settings.qa_dataset.clone(),
            multimodal_dataset: settings.multimodal_dataset.clone(),
            wordcloud_options: settings.wordcloud.clone(),
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn split(&self) -> Option<&str> {
        self.split.as_deref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    fn default_name(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::QuestionAnswering => &self.qa_dataset,
            DatasetKind::Multimodal => &self.multimodal_dataset,
        }
    }

    /// Apply one event and run a full render pass.
    pub async fn apply(&mut self, event: Event, source: &dyn DatasetSource) -> RenderPlan {
        self.handle(event);
        self.render(source).await
    }

    /// Update the state without rendering. Several events can be handled
    /// before a single [`render`](Session::render).
    pub fn handle(&mut self, event: Event) {
        tracing::debug!("session event: {:?}", event);
        match event {
            Event::Refresh => {}
            Event::Reload => self.reload = true,
            Event::SetKind(kind) => {
                self.kind = kind;
                self.name = self.default_name(kind).to_string();
                self.split = None;
            }
            Event::SetName(name) => {
                self.name = name.trim().to_string();
                self.split = None;
            }
            Event::SetSplit(split) => self.split = Some(split),
            Event::SetIndex(index) => self.index = index,
            Event::SetWordCloud(on) => self.show_wordcloud = on,
            Event::SetImageFolder(folder) => {
                self.image_folder = folder;
                self.image_index = 0;
            }
            Event::SetImageIndex(index) => self.image_index = index,
        }
    }

    fn controls(&self) -> Controls {
        Controls {
            kind: self.kind,
            name: self.name.clone(),
            split: self.split.clone(),
            index: self.index,
            wordcloud_available: self.kind == DatasetKind::QuestionAnswering,
            wordcloud: self.show_wordcloud,
            image_folder_available: self.kind == DatasetKind::Multimodal,
            image_folder: self.image_folder.clone(),
            image_index: self.image_index,
            ..Controls::default()
        }
    }

    /// Run the render pass for the current state.
    pub async fn render(&mut self, source: &dyn DatasetSource) -> RenderPlan {
        let mut plan = RenderPlan {
            controls: self.controls(),
            blocks: vec![Block::Title(TITLE.to_string())],
        };

        if std::mem::take(&mut self.reload) {
            source.invalidate();
        }
        let splits = match source.splits(&self.name).await {
            Ok(splits) if !splits.is_empty() => splits,
            Ok(_) => {
                let err = CoreError::DatasetNotFound(self.name.clone());
                plan.blocks.push(Block::Error(not_found_message(&self.name, &err)));
                return plan;
            }
            Err(e) => {
                tracing::warn!("listing splits of '{}' failed: {}", self.name, e);
                plan.blocks.push(Block::Error(e.to_string()));
                return plan;
            }
        };

        let split = match &self.split {
            Some(s) if splits.contains(s) => s.clone(),
            _ => splits[0].clone(),
        };
        self.split = Some(split.clone());
        plan.controls.splits = splits;
        plan.controls.split = Some(split.clone());

        let dataset = match source.load(&self.name, &split).await {
            Ok(dataset) => dataset,
            Err(e) => {
                tracing::warn!("loading {}[{}] failed: {}", self.name, split, e);
                plan.blocks.push(Block::Error(not_found_message(&self.name, &e)));
                return plan;
            }
        };

        plan.blocks.push(Block::DatasetSize {
            len: dataset.len(),
            total_rows: dataset.total_rows(),
        });
        if dataset.is_empty() {
            plan.blocks.push(Block::Warning(EMPTY_SPLIT_WARNING.to_string()));
            return plan;
        }

        let max_index = dataset.len() - 1;
        self.index = self.index.min(max_index);
        plan.controls.index = self.index;
        plan.controls.max_index = Some(max_index);

        let key = RecordKey {
            name: self.name.clone(),
            split,
            index: self.index,
        };
        if self.selection.select(key) {
            tracing::debug!("selection changed to record {}", self.index);
        }

        let Some(record) = dataset.get(self.index) else {
            return plan;
        };
        plan.blocks.push(Block::Keys(record.keys()));

        match record.view(self.kind) {
            RecordView::Qa(qa) => self.render_qa(&qa, &dataset, &mut plan),
            RecordView::Multimodal(mm) => {
                plan.blocks.push(Block::Fields(mm));
                self.render_images(&mut plan);
            }
        }

        plan
    }

    fn render_qa(&mut self, qa: &QaRecord, dataset: &Dataset, plan: &mut RenderPlan) {
        if let Some(context) = &qa.context {
            plan.blocks.push(Block::Context(context.clone()));
        }
        if qa.options.is_some() {
            plan.blocks.push(Block::Options(qa.numbered_options()));
        }

        let answer = qa.answer.first();
        if answer.is_none() {
            plan.blocks.push(Block::Warning(format!(
                "Record {} has no answer.",
                self.index
            )));
        }
        self.selection
            .conversation_mut()
            .populate_if_empty(&qa.question, answer.unwrap_or(NO_ANSWER_PLACEHOLDER));
        for message in self.selection.conversation().messages() {
            plan.blocks.push(Block::Chat(message.clone()));
        }

        if self.show_wordcloud {
            let text = dataset.joined_contexts();
            let cloud = WordCloud::generate(&text, &self.wordcloud_options);
            if cloud.is_empty() {
                plan.blocks.push(Block::Warning(EMPTY_CORPUS_WARNING.to_string()));
            } else {
                plan.blocks.push(Block::WordCloud(cloud));
            }
        }
    }

    fn render_images(&mut self, plan: &mut RenderPlan) {
        let listing = browse_images(&self.image_folder);
        if let Some(warning) = listing.warning() {
            plan.blocks.push(Block::Warning(warning.to_string()));
        }
        if let ImageListing::Found(files) = &listing {
            self.image_index = self.image_index.min(files.len() - 1);
            plan.controls.images = files.clone();
            plan.controls.image_index = self.image_index;
        }
        if let Some(name) = listing.select(self.image_index) {
            plan.blocks.push(Block::Image {
                path: Path::new(self.image_folder.trim()).join(name),
                name: name.to_string(),
            });
        }
    }
}

/// Inline message for a dataset that failed to load, naming the cause.
pub fn not_found_message(name: &str, cause: &CoreError) -> String {
    format!(
        "Dataset '{}' not found. Please check the dataset name and try again. ({})",
        name, cause
    )
}
