//! Dual-mode search dispatch
//!
//! One query string is sent down both paths: the keyword path through the
//! engine's registered search template, and the embedding path by encoding
//! the query locally and running a k-NN search over the precomputed
//! company-name embeddings.

use crate::config::SearchConfig;
use crate::embedding::EmbeddingProvider;
use crate::engine::{EngineClient, Hit};
use crate::error::{AbrError, Result};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write as _;
use std::sync::Arc;

/// Searcher running keyword and embedding search over the same index
///
/// The embedding provider is optional so keyword-only searches never touch
/// the model (and never trigger a first-use model download).
pub struct DualSearcher {
    client: EngineClient,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    index: String,
    config: SearchConfig,
}

/// Hits from both search modes for one query
#[derive(Debug, Serialize)]
pub struct DualResults {
    pub keyword: Vec<Hit>,
    pub embedding: Vec<Hit>,
}

impl DualSearcher {
    pub fn new(client: EngineClient, index: impl Into<String>, config: SearchConfig) -> Self {
        Self {
            client,
            provider: None,
            index: index.into(),
            config,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Keyword search through the registered template
    pub async fn keyword(&self, query: &str) -> Result<Vec<Hit>> {
        Self::validate(query)?;
        self.client
            .search_template(
                &self.index,
                &self.config.template_id,
                json!({ "company_name": query }),
            )
            .await
    }

    /// Embedding search: encode the query, then k-NN over the vector field
    pub async fn embedding(&self, query: &str) -> Result<Vec<Hit>> {
        Self::validate(query)?;
        let provider = self.provider.as_ref().ok_or_else(|| {
            AbrError::Config("Embedding search requires an embedding provider".to_string())
        })?;
        let vector = provider
            .embed_query(query)
            .map_err(|e| AbrError::Embedding(e.to_string()))?;
        self.client
            .knn_search(
                &self.index,
                &self.config.vector_field,
                &vector,
                self.config.k,
            )
            .await
    }

    /// Run both modes over one query
    pub async fn both(&self, query: &str) -> Result<DualResults> {
        let keyword = self.keyword(query).await?;
        let embedding = self.embedding(query).await?;
        Ok(DualResults { keyword, embedding })
    }

    fn validate(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(AbrError::InvalidQuery(
                "Query text cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Render one mode's hits as bordered blocks, or the empty-result state
pub fn render_hits(hits: &[Hit]) -> String {
    if hits.is_empty() {
        return "No results found\n".to_string();
    }

    let mut out = String::new();
    for hit in hits {
        let _ = writeln!(out, "+{}", "-".repeat(40));
        let _ = writeln!(out, "| Company: {}", hit.company_name());
        let _ = writeln!(out, "| State: {}", hit.state());
    }
    let _ = writeln!(out, "+{}", "-".repeat(40));
    out
}
