use serde::{Deserialize, Serialize};

/// One question/answer record from the FAQ corpus. Built once at load
/// time and never mutated; `id` is the position in the corpus and is
/// used as the ranking tie-break.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: usize,
    pub question: String,
    pub cleaned_question: String,
    pub answer: String,
    pub category: String,
}

/// A presentation-ready match: answer already formatted for display,
/// score rounded to four decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqMatch {
    pub question: String,
    pub answer: String,
    pub score: f32,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub matches: Vec<FaqMatch>,
    pub message: Option<String>,
    pub query: String,
}

impl QueryOutcome {
    pub fn total(&self) -> usize {
        self.matches.len()
    }
}
