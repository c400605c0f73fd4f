pub mod corpus;
pub mod embed;
pub mod encoder;
pub mod error;
pub mod format;
pub mod index;
pub mod loader;
pub mod model;
pub mod retrieval;
pub mod service;
pub mod text;

pub use corpus::{load_corpus, read_corpus};
pub use embed::{EmbeddingProvider, HashEmbeddingProvider};
pub use encoder::SentenceEncoder;
pub use error::FaqError;
pub use format::{format_answer, DEFAULT_MAX_ANSWER_LENGTH};
pub use index::SimilarityIndex;
pub use loader::{LoadedModel, LoaderConfig, ModelLoader};
pub use model::{FaqEntry, FaqMatch, QueryOutcome};
pub use retrieval::{cosine_similarity, rank};
pub use service::{QueryService, DEFAULT_TOP_K};
pub use text::clean_text;
