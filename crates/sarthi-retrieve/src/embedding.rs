//! Embedding-based retrieval over the vector collection.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use sarthi_index::VectorCollection;
use sarthi_infer::EmbedderBackend;

use crate::types::{RetrievedContext, Retriever};

/// Nearest documents fed into the prompt.
const TOP_K: usize = 3;

/// Semantic retriever: encodes the raw question and returns the top-k
/// indexed documents verbatim. No slot logic; the model reads whatever
/// the index surfaces. Degrades to empty context when no model is
/// loaded.
pub struct EmbeddingRetriever {
    embedder: Arc<dyn EmbedderBackend>,
    collection: Arc<VectorCollection>,
}

impl EmbeddingRetriever {
    pub fn new(embedder: Arc<dyn EmbedderBackend>, collection: Arc<VectorCollection>) -> Self {
        Self {
            embedder,
            collection,
        }
    }
}

#[async_trait]
impl Retriever for EmbeddingRetriever {
    async fn retrieve(&self, query: &str, _location: &str) -> RetrievedContext {
        if !self.embedder.is_available() {
            warn!("Embedder unavailable, returning empty context");
            return RetrievedContext::default();
        }

        let Some(embedding) = self.embedder.embed(query) else {
            warn!("Query embedding failed, returning empty context");
            return RetrievedContext::default();
        };

        let hits = match self.collection.search(&embedding, TOP_K) {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Vector search failed: {}", e);
                return RetrievedContext::default();
            }
        };

        debug!("Embedding retrieval returned {} documents", hits.len());

        let context = hits
            .iter()
            .map(|h| h.document.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        RetrievedContext {
            context,
            crop: None,
        }
    }
}
