//! Query orchestration: greeting shortcut, parameter clamping, ranking,
//! confidence filtering and advisory messaging.

use crate::error::FaqError;
use crate::format::{format_answer, DEFAULT_MAX_ANSWER_LENGTH};
use crate::loader::ModelLoader;
use crate::model::{FaqMatch, QueryOutcome};
use crate::retrieval::rank;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_TOP_K: i64 = 3;
const MAX_TOP_K: i64 = 10;
const LOW_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Conversational check-ins that get a canned reply instead of a
/// ranking pass. Substring match on the trimmed, lowercased question.
const CONVERSATIONAL_PATTERNS: &[&str] = &[
    "how are you",
    "how r u",
    "how are u",
    "how's it going",
    "what's up",
    "whats up",
    "hey",
    "hi there",
    "hello",
    "good morning",
    "good afternoon",
    "good evening",
];

const GREETING_QUESTION: &str = "How can I help you?";
const GREETING_ANSWER: &str = "Hello! I'm here to help with mental health questions. \
    You can ask me about:\n\n\u{2022} Stress and anxiety management\n\u{2022} Depression and mood\n\
    \u{2022} Sleep problems\n\u{2022} Coping strategies\n\u{2022} Mental health resources\n\
    \u{2022} Self-care tips\n\nWhat would you like to know about?";
const GREETING_MESSAGE: &str = "I'm ready to help with mental health questions!";

const NO_RESULTS_MESSAGE: &str = "No results found matching your criteria. \
    Try lowering the minimum score or rephrasing your question.";
const LOW_CONFIDENCE_MESSAGE: &str =
    "The results have low confidence. Consider rephrasing your question for better matches.";

pub struct QueryService {
    loader: Arc<ModelLoader>,
}

impl QueryService {
    pub fn new(loader: Arc<ModelLoader>) -> Self {
        Self { loader }
    }

    /// Answer a free-text question with ranked, confidence-filtered FAQ
    /// matches. `top_k` is clamped to [1, 10] and `min_score` to
    /// [0.0, 1.0]; out-of-range values are not an error.
    pub fn answer(
        &self,
        question: &str,
        top_k: i64,
        min_score: f64,
    ) -> Result<QueryOutcome, FaqError> {
        let trimmed = question.trim();
        let lowered = trimmed.to_lowercase();

        // UX bypass, not a ranking result; answers even before the
        // model is loaded.
        if CONVERSATIONAL_PATTERNS.iter().any(|p| lowered.contains(p)) {
            return Ok(greeting_outcome(question));
        }

        if trimmed.is_empty() {
            return Err(FaqError::EmptyQuestion);
        }

        let top_k = top_k.clamp(1, MAX_TOP_K) as usize;
        let min_score = min_score.clamp(0.0, 1.0) as f32;

        let model = self.loader.ensure_ready()?;

        debug!(
            question = %truncate_for_log(trimmed),
            top_k,
            min_score,
            "processing query"
        );

        let ranked = rank(model.encoder.as_ref(), &model.index, trimmed, top_k)?;

        // min_score drops matches from the already-selected window; it
        // never pulls in entries that fell outside top_k.
        let matches: Vec<FaqMatch> = ranked
            .into_iter()
            .filter(|(_, score)| *score >= min_score)
            .map(|(entry, score)| FaqMatch {
                question: entry.question.clone(),
                answer: format_answer(&entry.answer, DEFAULT_MAX_ANSWER_LENGTH),
                score: round_score(score),
                category: entry.category.clone(),
            })
            .collect();

        let message = if matches.is_empty() {
            Some(NO_RESULTS_MESSAGE.to_string())
        } else if matches[0].score < LOW_CONFIDENCE_THRESHOLD {
            Some(LOW_CONFIDENCE_MESSAGE.to_string())
        } else {
            None
        };

        Ok(QueryOutcome {
            matches,
            message,
            query: question.to_string(),
        })
    }
}

fn greeting_outcome(question: &str) -> QueryOutcome {
    QueryOutcome {
        matches: vec![FaqMatch {
            question: GREETING_QUESTION.to_string(),
            answer: GREETING_ANSWER.to_string(),
            score: 1.0,
            category: "Greeting".to_string(),
        }],
        message: Some(GREETING_MESSAGE.to_string()),
        query: question.to_string(),
    }
}

fn round_score(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}

fn truncate_for_log(question: &str) -> String {
    question.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashEmbeddingProvider;
    use crate::index::SimilarityIndex;
    use crate::loader::LoadedModel;
    use crate::model::FaqEntry;

    fn entry(id: usize, question: &str, answer: &str, category: &str) -> FaqEntry {
        FaqEntry {
            id,
            question: question.to_string(),
            cleaned_question: crate::text::clean_text(question),
            answer: answer.to_string(),
            category: category.to_string(),
        }
    }

    fn service_for(entries: Vec<FaqEntry>) -> QueryService {
        let loader = ModelLoader::with_builder(Box::new(move || {
            let encoder = Box::new(HashEmbeddingProvider::new(64));
            let index = SimilarityIndex::build(entries.clone(), encoder.as_ref())?;
            Ok(LoadedModel::new(encoder, index, "hash"))
        }));
        QueryService::new(Arc::new(loader))
    }

    fn sample_service() -> QueryService {
        service_for(vec![
            entry(
                0,
                "What is anxiety?",
                "Anxiety is a feeling of worry.",
                "Anxiety",
            ),
            entry(1, "How can I sleep better?", "Keep a routine.", "Sleep"),
            entry(2, "What helps with panic attacks?", "Breathe slowly.", "Anxiety"),
        ])
    }

    #[test]
    fn greeting_bypasses_ranking() {
        // loader that would fail if ever invoked
        let service = QueryService::new(Arc::new(ModelLoader::with_builder(Box::new(|| {
            anyhow::bail!("must not load for greetings")
        }))));

        for input in ["Hi there", "  hI THERE  ", "hello!", "What's up?"] {
            let outcome = service.answer(input, 3, 0.0).unwrap();
            assert_eq!(outcome.total(), 1);
            assert_eq!(outcome.matches[0].category, "Greeting");
            assert_eq!(outcome.matches[0].score, 1.0);
            assert_eq!(outcome.query, input);
        }
    }

    #[test]
    fn empty_question_is_rejected() {
        let service = sample_service();
        for input in ["", "   ", "\t\n"] {
            assert!(matches!(
                service.answer(input, 3, 0.0),
                Err(FaqError::EmptyQuestion)
            ));
        }
    }

    #[test]
    fn anxiety_scenario_returns_the_matching_entry() {
        let service = sample_service();
        let outcome = service.answer("what's anxiety", 1, 0.0).unwrap();

        assert_eq!(outcome.total(), 1);
        assert_eq!(outcome.matches[0].question, "What is anxiety?");
        assert_eq!(outcome.matches[0].category, "Anxiety");
        let score = outcome.matches[0].score;
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn top_k_is_clamped_to_bounds() {
        let entries: Vec<FaqEntry> = (0..12)
            .map(|i| entry(i, &format!("question topic{i}?"), "answer.", "General"))
            .collect();
        let service = service_for(entries);

        let outcome = service.answer("question topic", 50, 0.0).unwrap();
        assert_eq!(outcome.total(), 10);

        let outcome = service.answer("question topic", 0, 0.0).unwrap();
        assert_eq!(outcome.total(), 1);

        let outcome = service.answer("question topic", -5, 0.0).unwrap();
        assert_eq!(outcome.total(), 1);
    }

    #[test]
    fn min_score_is_clamped_and_filters() {
        let service = sample_service();

        // clamps to 0.0: nothing filtered
        let outcome = service.answer("anxiety worry", 3, -1.0).unwrap();
        assert_eq!(outcome.total(), 3);

        // clamps to 1.0: only perfect matches survive
        let outcome = service.answer("anxiety", 3, 5.0).unwrap();
        assert!(outcome.matches.iter().all(|m| m.score >= 1.0));
    }

    #[test]
    fn every_returned_match_satisfies_min_score() {
        let service = sample_service();
        let outcome = service.answer("sleep and panic", 10, 0.4).unwrap();
        assert!(outcome.matches.iter().all(|m| m.score >= 0.4));
    }

    #[test]
    fn unmatchable_min_score_yields_no_results_message() {
        let service = sample_service();
        let outcome = service.answer("zebra migration", 3, 0.9).unwrap();

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.total(), 0);
        let message = outcome.message.unwrap();
        assert!(message.contains("No results found"));
    }

    #[test]
    fn weak_best_match_yields_low_confidence_message() {
        let service = sample_service();
        // shares no tokens with the corpus: every score is 0.0
        let outcome = service.answer("zebra migration", 3, 0.0).unwrap();

        assert_eq!(outcome.total(), 3);
        let message = outcome.message.unwrap();
        assert!(message.contains("low confidence"));
    }

    #[test]
    fn confident_results_carry_no_message() {
        let service = sample_service();
        let outcome = service.answer("what's anxiety", 1, 0.0).unwrap();
        assert!(outcome.message.is_none());
    }

    #[test]
    fn answers_are_formatted_for_display() {
        let service = service_for(vec![entry(
            0,
            "What is stress?",
            "First sentence. Second sentence.",
            "Stress",
        )]);
        let outcome = service.answer("stress", 1, 0.0).unwrap();
        assert_eq!(outcome.matches[0].answer, "First sentence.\n\nSecond sentence.");
    }

    #[test]
    fn load_failure_surfaces_as_unavailable() {
        let service = QueryService::new(Arc::new(ModelLoader::with_builder(Box::new(|| {
            anyhow::bail!("corpus missing")
        }))));

        assert!(matches!(
            service.answer("what's anxiety", 3, 0.0),
            Err(FaqError::Unavailable(_))
        ));
    }
}
