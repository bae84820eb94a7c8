use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Question discriminant. Serialized forms match the spreadsheet parser's
/// type strings, so records round-trip through the surrounding pipeline
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "multiple choice")]
    MultipleChoice,
    #[serde(rename = "true/false")]
    TrueFalse,
    #[serde(rename = "matching")]
    Matching,
    #[serde(rename = "written question")]
    Written,
    #[serde(rename = "fake answer")]
    FakeAnswer,
}

/// Written-question sub-kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrittenKind {
    Short,
    Long,
}

/// One exam-question record, owned by the caller.
///
/// The engine reads fields and attaches annotations alongside the record
/// (see [`AnnotatedRecord`]); it never deletes or rewrites caller-owned
/// fields. Unknown fields survive in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q_type: Option<WrittenKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuestionRecord {
    pub fn new<S: Into<String>>(question_type: QuestionType, question: S) -> Self {
        Self {
            question_type,
            question: question.into(),
            a: None,
            b: None,
            c: None,
            d: None,
            e: None,
            answer: String::new(),
            category: String::new(),
            q_type: None,
            image: None,
            extra: Map::new(),
        }
    }

    /// Multiple-choice convenience constructor; options beyond the slice
    /// length stay unset
    pub fn multiple_choice<S: Into<String>>(question: S, options: &[&str]) -> Self {
        let mut record = Self::new(QuestionType::MultipleChoice, question);
        let slots = [
            &mut record.a,
            &mut record.b,
            &mut record.c,
            &mut record.d,
            &mut record.e,
        ];
        for (slot, option) in slots.into_iter().zip(options.iter()) {
            *slot = Some((*option).to_string());
        }
        record
    }

    pub fn with_answer<S: Into<String>>(mut self, answer: S) -> Self {
        self.answer = answer.into();
        self
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Option fields a through e, in order
    pub fn options(&self) -> [Option<&str>; 5] {
        [
            self.a.as_deref(),
            self.b.as_deref(),
            self.c.as_deref(),
            self.d.as_deref(),
            self.e.as_deref(),
        ]
    }
}

/// Duplicate-group metadata for one record.
///
/// Attached alongside the record rather than injected into it, so the
/// record's structural integrity is preserved. Presence of an annotation
/// means the record sits in a group of size greater than one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateAnnotation {
    /// 1-based group id, assigned in discovery order, stable within a run
    pub group_id: u32,
    /// True only for the group's chosen representative
    pub representative: bool,
    /// Similarity to the group representative; 1.0 for the representative
    pub similarity: f64,
}

/// A record plus its optional duplicate annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub record: QuestionRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<DuplicateAnnotation>,
}

impl AnnotatedRecord {
    pub fn is_duplicate(&self) -> bool {
        self.annotation.is_some()
    }
}

/// A record dropped in remove mode, citing the representative kept in its
/// place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalEntry {
    pub question: QuestionRecord,
    pub kept_instead: QuestionRecord,
    pub similarity: f64,
}

/// Per-member entry in a reported group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub question_text: String,
    pub is_representative: bool,
    pub similarity: f64,
}

/// One duplicate group as reported to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group_id: u32,
    pub size: usize,
    pub representative_text: String,
    pub members: Vec<GroupMember>,
}

/// Summary of one detection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub groups: Vec<GroupSummary>,
    /// Number of groups of size > 1
    pub group_count: usize,
    /// Total records involved in any group of size > 1
    pub duplicate_question_count: usize,
    pub similarity_threshold: f64,
    /// Pairs that cleared the prefilter and received detailed scoring
    pub candidate_pair_count: usize,
    /// Semantic signal contributed 0 for all pairs this run
    pub semantic_degraded: bool,
    /// Corpus TF-IDF fit failed; prefilter fell back to all pairs
    pub tfidf_degraded: bool,
    pub elapsed_ms: u64,
    pub generated_at: DateTime<Utc>,
}

impl DetectionReport {
    /// True when any signal ran in degraded mode and results carry reduced
    /// confidence
    pub fn is_degraded(&self) -> bool {
        self.semantic_degraded || self.tfidf_degraded
    }
}
