use lazy_static::lazy_static;
use regex::Regex;

use crate::record::{QuestionRecord, QuestionType};

lazy_static! {
    // Everything except word characters, whitespace and question marks.
    // Question marks are kept: they distinguish questions from statements.
    static ref PUNCTUATION_RE: Regex = Regex::new(r"[^\w\s?]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Canonicalize text for comparison: lowercase, strip punctuation except
/// question marks, collapse whitespace. Empty or whitespace-only input
/// yields an empty string.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION_RE.replace_all(&lowered, " ");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Extract the text a record is compared by.
///
/// Multiple choice concatenates the stem with all non-empty options. Written
/// questions append the answer only when it is longer than
/// `min_answer_chars` — short answers would skew similarity toward trivial
/// text. Every other type compares by the stem alone.
pub fn comparable_text(record: &QuestionRecord, min_answer_chars: usize) -> String {
    let mut text = record.question.clone();

    match record.question_type {
        QuestionType::MultipleChoice => {
            for option in record.options().into_iter().flatten() {
                if !option.trim().is_empty() {
                    text.push(' ');
                    text.push_str(option);
                }
            }
        }
        QuestionType::Written => {
            if record.answer.chars().count() > min_answer_chars {
                text.push(' ');
                text.push_str(&record.answer);
            }
        }
        _ => {}
    }

    text
}
