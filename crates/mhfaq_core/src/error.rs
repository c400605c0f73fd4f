use thiserror::Error;

/// Per-request failure taxonomy. The HTTP layer maps these onto status
/// codes: `EmptyQuestion` → 400, `Unavailable` → 503, `Internal` → 500.
#[derive(Error, Debug)]
pub enum FaqError {
    #[error("question cannot be empty")]
    EmptyQuestion,

    #[error("model is not available: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
