//! Answer display formatting.

pub const DEFAULT_MAX_ANSWER_LENGTH: usize = 1000;

const TRUNCATION_NOTICE: &str = "[Response truncated. Ask for more details if needed.]";

/// Break a raw answer into paragraphs for display: every sentence end
/// (period followed by a space) becomes a paragraph break. Answers
/// longer than `max_length` are cut down to their first five sentences
/// plus a fixed truncation notice.
///
/// Not idempotent: reapplying it to already-formatted text inserts
/// duplicate breaks, so it runs exactly once per raw answer.
pub fn format_answer(text: &str, max_length: usize) -> String {
    let formatted = text.trim().replace(". ", ".\n\n");

    if formatted.len() > max_length {
        let sentences: Vec<&str> = formatted.split('.').collect();
        if sentences.len() > 5 {
            let mut summary = sentences[..5].join(".");
            summary.push_str(".\n\n");
            summary.push_str(TRUNCATION_NOTICE);
            return summary;
        }
    }

    formatted
}
