//! Embedding backend trait.

use ndarray::Array1;

/// Trait for sentence embedding backends.
///
/// Returning `None` from `embed` means the backend cannot serve
/// embeddings (missing model, failed inference); callers degrade rather
/// than fail the request.
pub trait EmbedderBackend: Send + Sync {
    /// Encode one text into a fixed-length vector.
    fn embed(&self, text: &str) -> Option<Array1<f32>>;

    /// Encode a batch of texts. The default encodes sequentially.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Option<Array1<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Embedding dimension.
    fn dimension(&self) -> usize;

    /// Whether a model is actually loaded.
    fn is_available(&self) -> bool;
}

/// Placeholder embedder for deployments without model files.
pub struct NoopEmbedder {
    dim: usize,
}

impl NoopEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl EmbedderBackend for NoopEmbedder {
    fn embed(&self, _text: &str) -> Option<Array1<f32>> {
        None
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_available(&self) -> bool {
        false
    }
}
