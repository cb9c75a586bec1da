//! Agri-Sarthi Infer — sentence embedding backends.
//!
//! `EmbedderBackend` abstracts the embedding model used for both index
//! builds and query encoding. With the `onnx` feature enabled and model
//! files present, `OnnxEmbedder` serves all-MiniLM-L6-v2 embeddings;
//! otherwise `NoopEmbedder` signals that semantic retrieval is
//! unavailable and the keyword pipeline carries the load.

pub mod cache;
pub mod embedder;
pub mod onnx_embedder;

pub use cache::QueryCache;
pub use embedder::{EmbedderBackend, NoopEmbedder};

#[cfg(feature = "onnx")]
pub use onnx_embedder::OnnxEmbedder;

use std::path::Path;
use std::sync::Arc;

/// Embedding dimension of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Create the best available embedder for the given model directory.
pub fn create_embedder(model_dir: &Path) -> Arc<dyn EmbedderBackend> {
    #[cfg(feature = "onnx")]
    {
        match OnnxEmbedder::load(model_dir) {
            Ok(embedder) => {
                tracing::info!("Using ONNX embedder (dim={})", embedder.dimension());
                return Arc::new(embedder);
            }
            Err(e) => {
                tracing::warn!(
                    "ONNX embedder unavailable: {}. Semantic retrieval disabled.",
                    e
                );
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = model_dir;
        tracing::info!("ONNX feature disabled; semantic retrieval unavailable.");
    }

    Arc::new(NoopEmbedder::new(EMBEDDING_DIM))
}
