//! Dataset records and the typed views rendered for each dataset kind.
//!
//! A [`Record`] is schema-less: whatever JSON object the source produced.
//! [`RecordView`] resolves the fields the viewer cares about once, so the
//! renderer matches on variants instead of probing keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CoreError, DatasetKind, Result};

/// Robot message content used when a record carries no usable answer.
pub const NO_ANSWER_PLACEHOLDER: &str = "(no answer available)";

/// Field names that hold a plain image location when their value is a string.
const IMAGE_FIELD_NAMES: &[&str] = &[
    "file_name",
    "filename",
    "path",
    "url",
    "coco_url",
    "flickr_url",
];

/// One dataset entry: field name to JSON value, in source order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from any JSON value. Only objects are records.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CoreError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The `context` field as display text, if present.
    pub fn context(&self) -> Option<String> {
        self.get("context").map(value_to_text)
    }

    /// Resolve the typed view for the given dataset kind.
    pub fn view(&self, kind: DatasetKind) -> RecordView {
        match kind {
            DatasetKind::QuestionAnswering => RecordView::Qa(QaRecord::from_record(self)),
            DatasetKind::Multimodal => RecordView::Multimodal(MultimodalRecord::from_record(self)),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Typed view of a record for a given dataset kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordView {
    Qa(QaRecord),
    Multimodal(MultimodalRecord),
}

/// The answer of a QA record, by where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// `correct_option` (1-based) into `options`. `text` is `None` when the
    /// number does not address an option.
    CorrectOption { number: i64, text: Option<String> },
    /// `answers.text`, possibly several spans.
    Spans(Vec<String>),
    /// Neither `correct_option` nor `answers` present.
    Missing,
}

impl Answer {
    /// The answer shown in the conversation: the first text, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            Answer::CorrectOption { text, .. } => text.as_deref(),
            Answer::Spans(spans) => spans.first().map(String::as_str),
            Answer::Missing => None,
        }
    }
}

/// Fields of a question-answering record.
#[derive(Debug, Clone, PartialEq)]
pub struct QaRecord {
    pub context: Option<String>,
    /// `query`, else `question`, else empty.
    pub question: String,
    pub options: Option<Vec<String>>,
    pub answer: Answer,
}

impl QaRecord {
    pub fn from_record(record: &Record) -> Self {
        let context = record.context();

        let question = record
            .get("query")
            .or_else(|| record.get("question"))
            .map(value_to_text)
            .unwrap_or_default();

        let options = record.get("options").map(value_to_list);

        let answer = if let Some(correct) = record.get("correct_option") {
            let number = value_to_i64(correct).unwrap_or(0);
            let text = options.as_ref().and_then(|opts| {
                usize::try_from(number)
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| opts.get(i).cloned())
            });
            Answer::CorrectOption { number, text }
        } else if let Some(answers) = record.get("answers") {
            let texts = match answers {
                Value::Object(obj) => obj.get("text").map(value_to_list).unwrap_or_default(),
                other => value_to_list(other),
            };
            Answer::Spans(texts)
        } else {
            Answer::Missing
        };

        Self {
            context,
            question,
            options,
            answer,
        }
    }

    /// Options formatted as a 1-indexed list (`"1. Paris"`).
    pub fn numbered_options(&self) -> Vec<String> {
        self.options
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, opt)| format!("{}. {}", i + 1, opt))
            .collect()
    }
}

/// A reference to an image carried by a multimodal record.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub field: String,
    /// URL or path of the image.
    pub location: String,
    pub width: Option<u64>,
    pub height: Option<u64>,
}

/// Fields of a multimodal record, grouped for display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultimodalRecord {
    pub text_fields: Vec<(String, String)>,
    pub images: Vec<ImageRef>,
    pub other_fields: Vec<(String, String)>,
}

impl MultimodalRecord {
    pub fn from_record(record: &Record) -> Self {
        let mut view = Self::default();

        for (name, value) in record.fields() {
            if let Some(image) = image_ref(name, value) {
                view.images.push(image);
                continue;
            }
            match value {
                Value::String(s) => view.text_fields.push((name.clone(), s.clone())),
                Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => {
                    view.text_fields.push((name.clone(), value_to_list(value).join(" | ")));
                }
                other => view.other_fields.push((name.clone(), value_to_text(other))),
            }
        }

        view
    }
}

fn image_ref(name: &str, value: &Value) -> Option<ImageRef> {
    match value {
        Value::Object(obj) => {
            let location = ["src", "path", "url"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str))?;
            Some(ImageRef {
                field: name.to_string(),
                location: location.to_string(),
                width: obj.get("width").and_then(Value::as_u64),
                height: obj.get("height").and_then(Value::as_u64),
            })
        }
        Value::String(s) => {
            let lower = name.to_ascii_lowercase();
            if lower.starts_with("image") || IMAGE_FIELD_NAMES.contains(&lower.as_str()) {
                Some(ImageRef {
                    field: name.to_string(),
                    location: s.clone(),
                    width: None,
                    height: None,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Display text for a JSON value: strings verbatim, scalars stringified,
/// containers as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A value as a list of display texts. Non-arrays become a one-element list.
fn value_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        Value::Null => Vec::new(),
        other => vec![value_to_text(other)],
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn squad_style_record() {
        let r = record(json!({
            "context": "A cat sat.",
            "query": "What sat?",
            "answers": {"text": ["A cat"], "answer_start": [0]}
        }));
        let qa = QaRecord::from_record(&r);
        assert_eq!(qa.context.as_deref(), Some("A cat sat."));
        assert_eq!(qa.question, "What sat?");
        assert_eq!(qa.answer.first(), Some("A cat"));
        assert!(qa.options.is_none());
    }

    #[test]
    fn query_takes_precedence_over_question() {
        let r = record(json!({"query": "q1", "question": "q2"}));
        assert_eq!(QaRecord::from_record(&r).question, "q1");

        let r = record(json!({"question": "q2"}));
        assert_eq!(QaRecord::from_record(&r).question, "q2");

        let r = record(json!({"context": "no question here"}));
        assert_eq!(QaRecord::from_record(&r).question, "");
    }

    #[test]
    fn correct_option_is_one_indexed() {
        let r = record(json!({
            "question": "Capital of the UK?",
            "options": ["Paris", "London"],
            "correct_option": 2
        }));
        let qa = QaRecord::from_record(&r);
        assert_eq!(qa.answer.first(), Some("London"));
        assert_eq!(qa.numbered_options(), vec!["1. Paris", "2. London"]);
    }

    #[test]
    fn correct_option_wins_over_answers() {
        let r = record(json!({
            "options": ["a", "b"],
            "correct_option": 1,
            "answers": {"text": ["ignored"]}
        }));
        assert_eq!(QaRecord::from_record(&r).answer.first(), Some("a"));
    }

    #[test]
    fn correct_option_out_of_range_has_no_text() {
        let r = record(json!({"options": ["a"], "correct_option": 5}));
        let qa = QaRecord::from_record(&r);
        assert_eq!(
            qa.answer,
            Answer::CorrectOption {
                number: 5,
                text: None
            }
        );
        assert_eq!(qa.answer.first(), None);

        let r = record(json!({"options": ["a"], "correct_option": 0}));
        assert_eq!(QaRecord::from_record(&r).answer.first(), None);
    }

    #[test]
    fn correct_option_as_string_number() {
        let r = record(json!({"options": ["x", "y", "z"], "correct_option": "3"}));
        assert_eq!(QaRecord::from_record(&r).answer.first(), Some("z"));
    }

    #[test]
    fn empty_answers_list_is_not_a_panic() {
        let r = record(json!({"question": "?", "answers": {"text": []}}));
        let qa = QaRecord::from_record(&r);
        assert_eq!(qa.answer, Answer::Spans(vec![]));
        assert_eq!(qa.answer.first(), None);
    }

    #[test]
    fn missing_answer_fields() {
        let r = record(json!({"question": "?"}));
        assert_eq!(QaRecord::from_record(&r).answer, Answer::Missing);
    }

    #[test]
    fn answers_text_as_single_string() {
        let r = record(json!({"answers": {"text": "only one"}}));
        assert_eq!(QaRecord::from_record(&r).answer, Answer::Spans(vec!["only one".into()]));
    }

    #[test]
    fn keys_keep_source_order() {
        let r = record(json!({"id": "1", "title": "t", "context": "c", "question": "q"}));
        assert_eq!(r.keys(), vec!["id", "title", "context", "question"]);
    }

    #[test]
    fn non_object_is_invalid() {
        let err = Record::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn multimodal_groups_fields() {
        let r = record(json!({
            "image": {"src": "https://example.org/1.jpg", "width": 640, "height": 480},
            "file_name": "000000391895.jpg",
            "caption": "A man riding a bike",
            "tags": ["bike", "man"],
            "id": 391895
        }));
        let mm = MultimodalRecord::from_record(&r);
        assert_eq!(mm.images.len(), 2);
        assert_eq!(mm.images[0].location, "https://example.org/1.jpg");
        assert_eq!(mm.images[0].width, Some(640));
        assert_eq!(mm.images[1].location, "000000391895.jpg");
        assert_eq!(
            mm.text_fields,
            vec![
                ("caption".to_string(), "A man riding a bike".to_string()),
                ("tags".to_string(), "bike | man".to_string()),
            ]
        );
        assert_eq!(mm.other_fields, vec![("id".to_string(), "391895".to_string())]);
    }

    #[test]
    fn view_dispatches_on_kind() {
        let r = record(json!({"question": "q", "answers": {"text": ["a"]}}));
        assert!(matches!(r.view(DatasetKind::QuestionAnswering), RecordView::Qa(_)));
        assert!(matches!(r.view(DatasetKind::Multimodal), RecordView::Multimodal(_)));
    }
}
