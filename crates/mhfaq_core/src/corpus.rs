//! FAQ corpus loading from the tabular (CSV) corpus file.
//!
//! Expects `Questions` and `Answers` columns; `category` and
//! `cleaned_question` are optional. When `cleaned_question` is absent
//! the cleaned form is computed at load time, so every entry is fully
//! validated exactly once and never re-checked per request.

use crate::model::FaqEntry;
use crate::text::clean_text;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DEFAULT_CATEGORY: &str = "General";

pub fn load_corpus(path: &Path) -> Result<Vec<FaqEntry>> {
    let file = File::open(path).with_context(|| format!("open corpus {}", path.display()))?;
    read_corpus(file).with_context(|| format!("read corpus {}", path.display()))
}

pub fn read_corpus<R: Read>(reader: R) -> Result<Vec<FaqEntry>> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers().context("read csv headers")?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let question_col = column("Questions").context("missing column 'Questions'")?;
    let answer_col = column("Answers").context("missing column 'Answers'")?;
    let category_col = column("category");
    let cleaned_col = column("cleaned_question");

    let mut entries = Vec::new();
    for (row, record) in csv.records().enumerate() {
        let record = record.with_context(|| format!("read csv row {}", row + 1))?;
        let field = |col: usize| record.get(col).unwrap_or("").trim();

        let question = field(question_col);
        let answer = field(answer_col);
        if question.is_empty() || answer.is_empty() {
            continue;
        }

        let category = category_col
            .map(field)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        let cleaned_question = cleaned_col
            .map(field)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| clean_text(question));

        entries.push(FaqEntry {
            id: entries.len(),
            question: question.to_owned(),
            cleaned_question,
            answer: answer.to_owned(),
            category: category.to_owned(),
        });
    }

    Ok(entries)
}
