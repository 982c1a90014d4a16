//! End-to-end session flows over a [`LocalSource`] directory.
//!
//! Everything runs against files written to a temp dir; no network access.

use std::path::Path;
use std::sync::Arc;

use dsviewer_core::config_file::Settings;
use dsviewer_core::source::{SourceKind, SourceSettings, build_source};
use dsviewer_core::{
    Block, CachedSource, DatasetKind, DatasetSource, Event, LocalSource, Role, Session,
};

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// A tiny squad-like dataset with two splits plus a multiple-choice one.
fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        &dir.path().join("squad/train.jsonl"),
        concat!(
            r#"{"context": "A cat sat.", "query": "What sat?", "answers": {"text": ["A cat"]}}"#,
            "\n",
            r#"{"context": "The cat slept on the mat.", "question": "Where?", "answers": {"text": ["on the mat"]}}"#,
            "\n\n",
        ),
    );
    write(
        &dir.path().join("squad/validation.json"),
        r#"[{"context": "Rain falls.", "question": "What falls?", "answers": {"text": "Rain"}}]"#,
    );
    write(
        &dir.path().join("quiz/test.json"),
        r#"{"data": [{"question": "Capital of the UK?", "options": ["Paris", "London"], "correct_option": 2}]}"#,
    );
    dir
}

fn local(dir: &Path) -> CachedSource<LocalSource> {
    CachedSource::new(LocalSource::new(dir))
}

#[tokio::test]
async fn browse_records_and_splits() {
    let dir = fixture();
    let source = local(dir.path());
    let mut session = Session::default();

    let plan = session.apply(Event::Refresh, &source).await;
    assert!(!plan.has_error(), "{:?}", plan.blocks);
    assert_eq!(plan.controls.splits, vec!["train", "validation"]);
    assert!(plan.blocks.contains(&Block::DatasetSize { len: 2, total_rows: 2 }));

    let texts: Vec<_> = plan.messages().map(|m| (m.role, m.content.as_str())).collect();
    assert_eq!(texts, vec![(Role::User, "What sat?"), (Role::Robot, "A cat")]);

    let plan = session.apply(Event::SetIndex(1), &source).await;
    let texts: Vec<_> = plan.messages().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, vec!["Where?", "on the mat"]);

    let plan = session
        .apply(Event::SetSplit("validation".into()), &source)
        .await;
    assert_eq!(plan.controls.index, 0);
    let texts: Vec<_> = plan.messages().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, vec!["What falls?", "Rain"]);
}

#[tokio::test]
async fn multiple_choice_answer() {
    let dir = fixture();
    let source = local(dir.path());
    let mut session = Session::default();

    let plan = session.apply(Event::SetName("quiz".into()), &source).await;
    assert_eq!(plan.controls.split.as_deref(), Some("test"));
    assert_eq!(plan.messages().nth(1).unwrap().content, "London");
}

#[tokio::test]
async fn missing_dataset_is_reported_inline() {
    let dir = fixture();
    let source = local(dir.path());
    let mut session = Session::default();

    let plan = session.apply(Event::SetName("../etc".into()), &source).await;
    assert!(plan.has_error());
    assert!(plan.messages().next().is_none());

    // the session recovers on the next valid interaction
    let plan = session.apply(Event::SetName("squad".into()), &source).await;
    assert!(!plan.has_error());
}

#[tokio::test]
async fn wordcloud_counts_whole_split() {
    let dir = fixture();
    let source = local(dir.path());
    let mut session = Session::default();

    let plan = session.apply(Event::SetWordCloud(true), &source).await;
    let cloud = plan.wordcloud().expect("cloud");
    let top = &cloud.words[0];
    assert_eq!(top.text, "cat");
    assert_eq!(top.count, 2);
    assert!(cloud.to_svg().contains(">cat</text>"));
}

#[tokio::test]
async fn splits_and_rows_are_cached() {
    let dir = fixture();
    let source = local(dir.path());
    let mut session = Session::default();

    for i in 0..3 {
        session.apply(Event::SetIndex(i % 2), &source).await;
    }
    assert_eq!(source.cached_splits(), 1);
    assert_eq!(source.misses(), 2);
    assert_eq!(source.hits(), 4);
}

#[tokio::test]
async fn built_source_uses_settings() {
    let dir = fixture();
    let mut settings = Settings::default();
    settings.source = SourceSettings {
        kind: SourceKind::Local,
        local_root: Some(dir.path().to_path_buf()),
        ..SourceSettings::default()
    };
    settings.multimodal_dataset = "quiz".into();

    let source: Arc<dyn DatasetSource> = build_source(&settings.source).unwrap();
    let mut session = Session::new(&settings);
    let plan = session
        .apply(Event::SetKind(DatasetKind::Multimodal), source.as_ref())
        .await;

    assert_eq!(session.name(), "quiz");
    assert!(!plan.has_error());
    assert!(plan.blocks.iter().any(|b| matches!(b, Block::Fields(_))));
}
