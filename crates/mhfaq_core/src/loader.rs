//! Once-only construction of the encoder and similarity index.
//!
//! The loader is an explicit service object handed to request handlers,
//! not a process global. The build runs while the state mutex is held,
//! so concurrent first callers block on the lock and then observe the
//! cached outcome; the index is never built twice.

use crate::corpus::load_corpus;
use crate::embed::{EmbeddingProvider, HashEmbeddingProvider};
use crate::encoder::SentenceEncoder;
use crate::error::FaqError;
use crate::index::SimilarityIndex;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{error, info};

pub struct LoadedModel {
    pub encoder: Box<dyn EmbeddingProvider>,
    pub index: SimilarityIndex,
    pub model_name: String,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    pub fn new(
        encoder: Box<dyn EmbeddingProvider>,
        index: SimilarityIndex,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            encoder,
            index,
            model_name: model_name.into(),
            loaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub corpus_path: PathBuf,
    pub model_path: Option<PathBuf>,
    pub tokenizer_path: Option<PathBuf>,
}

enum LoadState {
    Unloaded,
    Ready(Arc<LoadedModel>),
    Failed(String),
}

type Builder = Box<dyn Fn() -> Result<LoadedModel> + Send + Sync>;

pub struct ModelLoader {
    state: Mutex<LoadState>,
    // Ready model published outside the state mutex so readiness checks
    // never wait on an in-flight build.
    published: OnceLock<Arc<LoadedModel>>,
    builder: Builder,
}

impl ModelLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_builder(Box::new(move || build_model(&config)))
    }

    /// Inject the build step; used by tests and embedders that are not
    /// file-backed.
    pub fn with_builder(builder: Builder) -> Self {
        Self {
            state: Mutex::new(LoadState::Unloaded),
            published: OnceLock::new(),
            builder,
        }
    }

    /// Return the loaded model, building it on the first call. A failed
    /// build is cached: every later call gets `Unavailable` until the
    /// process restarts.
    pub fn ensure_ready(&self) -> Result<Arc<LoadedModel>, FaqError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match &*state {
            LoadState::Ready(model) => Ok(model.clone()),
            LoadState::Failed(reason) => Err(FaqError::Unavailable(reason.clone())),
            LoadState::Unloaded => {
                info!("loading FAQ model and corpus");
                match (self.builder)() {
                    Ok(model) => {
                        let model = Arc::new(model);
                        info!(
                            model = %model.model_name,
                            entries = model.index.size(),
                            dimension = model.index.dimension(),
                            loaded_at = %model.loaded_at,
                            "FAQ model ready"
                        );
                        let _ = self.published.set(model.clone());
                        *state = LoadState::Ready(model.clone());
                        Ok(model)
                    }
                    Err(err) => {
                        let reason = format!("{err:#}");
                        error!(error = %reason, "FAQ model failed to load");
                        *state = LoadState::Failed(reason.clone());
                        Err(FaqError::Unavailable(reason))
                    }
                }
            }
        }
    }

    /// The loaded model if the build has already succeeded. Never
    /// triggers a load and never blocks on one in flight; used by
    /// /health and /stats.
    pub fn ready(&self) -> Option<Arc<LoadedModel>> {
        self.published.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.ready().is_some()
    }
}

fn build_model(config: &LoaderConfig) -> Result<LoadedModel> {
    let (encoder, model_name): (Box<dyn EmbeddingProvider>, String) =
        match (&config.model_path, &config.tokenizer_path) {
            (Some(model), Some(tokenizer)) => {
                let name = model
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| model.display().to_string());
                (Box::new(SentenceEncoder::load(model, tokenizer)?), name)
            }
            (None, None) => (
                Box::new(HashEmbeddingProvider::default()),
                "hash".to_string(),
            ),
            _ => anyhow::bail!("model-path and tokenizer-path must both be provided"),
        };

    let entries = load_corpus(&config.corpus_path)?;
    let index = SimilarityIndex::build(entries, encoder.as_ref())?;
    Ok(LoadedModel::new(encoder, index, model_name))
}
