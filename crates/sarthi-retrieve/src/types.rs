//! Retriever trait and its output type.

use async_trait::async_trait;

/// Context assembled for one question.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    /// Flattened context string handed to the prompt builder.
    pub context: String,
    /// Canonical crop name, when one was detected.
    pub crop: Option<String>,
}

/// Strategy for building prompt context from a question.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, location: &str) -> RetrievedContext;
}
