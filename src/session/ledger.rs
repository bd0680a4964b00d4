// src/session/ledger.rs

use std::collections::HashMap;

use crate::models::{question::Question, submission::Answer};

/// Live answers of one session, keyed by question id.
#[derive(Debug, Clone, Default)]
pub struct AnswerLedger {
    entries: HashMap<u64, String>,
    /// Bumped on every write so a cached submission can tell it is stale.
    revision: u64,
}

impl AnswerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `text` for the question, replacing any earlier answer.
    pub fn record(&mut self, question_id: u64, text: impl Into<String>) {
        self.entries.insert(question_id, text.into());
        self.revision += 1;
    }

    /// Current answer, or `""` if the question was never answered.
    pub fn answer(&self, question_id: u64) -> &str {
        self.entries.get(&question_id).map_or("", String::as_str)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Questions with a non-blank answer.
    pub fn attempted(&self) -> usize {
        self.entries.values().filter(|a| !a.trim().is_empty()).count()
    }

    /// One `Answer` per question, in the order given.
    pub fn answers_for(&self, questions: &[Question]) -> Vec<Answer> {
        questions
            .iter()
            .map(|q| Answer {
                question_id: q.id,
                answer: self.answer(q.id).to_string(),
            })
            .collect()
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Trimmed, case-insensitive comparison. A blank answer is never correct.
/// The option list of an MCQ question is not consulted.
pub fn is_correct(given: &str, expected: &str) -> bool {
    let given = normalize(given);
    !given.is_empty() && given == normalize(expected)
}

/// Number of questions whose recorded answer matches the correct one.
pub fn score(questions: &[Question], ledger: &AnswerLedger) -> u32 {
    questions
        .iter()
        .filter(|q| is_correct(ledger.answer(q.id), &q.correct_answer))
        .count() as u32
}
