/// Embedding provider trait and FastEmbed implementation
use crate::config::EmbeddingConfig;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    InitializationError(String),

    #[error("Embedding generation failed: {0}")]
    GenerationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Trait for embedding providers
///
/// Allows abstraction over different embedding backends and lets tests run
/// against a deterministic fake instead of a downloaded model.
pub trait EmbeddingProvider: Send + Sync {
    /// Encode a search query (task prefix applied)
    fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Encode passages for indexing (task prefix applied, batched)
    fn embed_passages(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// FastEmbed provider for local embedding generation
///
/// Models are downloaded on-demand to `~/.cache/huggingface/` on first use.
/// multilingual-e5-small (the default, 384-dim) is ~120MB.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimension: usize,
    batch_size: usize,
    query_prefix: String,
    passage_prefix: String,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("batch_size", &self.batch_size)
            .field("query_prefix", &self.query_prefix)
            .field("passage_prefix", &self.passage_prefix)
            .finish_non_exhaustive()
    }
}

impl FastEmbedProvider {
    /// Create a new FastEmbed provider from the embedding configuration
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let (embedding_model, dimension) = match config.model.as_str() {
            "multilingual-e5-small" => (EmbeddingModel::MultilingualE5Small, 384),
            "all-MiniLM-L6-v2" | "all-minilm-l6-v2" => (EmbeddingModel::AllMiniLML6V2, 384),
            "bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
            other => {
                return Err(EmbeddingError::InitializationError(format!(
                    "Unsupported model: {}. Supported: multilingual-e5-small, all-MiniLM-L6-v2, bge-small-en-v1.5",
                    other
                )));
            }
        };

        tracing::info!(
            "Initializing embedding model: {} ({}D, downloaded on first use)",
            config.model,
            dimension
        );

        let init_options = InitOptions::new(embedding_model).with_show_download_progress(true);
        let model = TextEmbedding::try_new(init_options)
            .map_err(|e| EmbeddingError::InitializationError(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: config.model.clone(),
            dimension,
            batch_size: config.batch_size,
            query_prefix: config.query_prefix.clone(),
            passage_prefix: config.passage_prefix.clone(),
        })
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput("Empty query".to_string()));
        }

        let prefixed = format!("{}{}", self.query_prefix, text);
        let mut embeddings = self
            .model
            .embed(vec![prefixed], None)
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?;

        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::GenerationError("No embedding returned".to_string()))
    }

    fn embed_passages(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prefixed: Vec<String> = texts
            .iter()
            .map(|t| format!("{}{}", self.passage_prefix, t))
            .collect();

        self.model
            .embed(prefixed, Some(self.batch_size))
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
