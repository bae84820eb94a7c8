use crate::record::{QuestionRecord, QuestionType};

/// Completeness score of a record: how much usable content it carries.
///
/// Answers are weighted double — a complete answer is a stronger signal of
/// record quality than a long question stem.
pub fn completeness_score(record: &QuestionRecord) -> i64 {
    let mut score = record.question.trim().len() as i64;

    if record.question_type == QuestionType::MultipleChoice {
        for option in record.options().into_iter().flatten() {
            score += option.trim().len() as i64;
        }
    }

    score += record.answer.trim().len() as i64 * 2;

    if !record.category.trim().is_empty() {
        score += 10;
    }
    if record.image.as_deref().is_some_and(|i| !i.is_empty()) {
        score += 20;
    }

    score
}

/// Pick the representative of a group: the member with the maximum
/// completeness score, ties broken by input order (first seen wins).
/// `members` holds record indices in input order.
pub fn select_representative(members: &[usize], records: &[QuestionRecord]) -> usize {
    debug_assert!(!members.is_empty());
    let mut best = members[0];
    let mut best_score = completeness_score(&records[best]);
    for &index in &members[1..] {
        let score = completeness_score(&records[index]);
        if score > best_score {
            best = index;
            best_score = score;
        }
    }
    best
}
