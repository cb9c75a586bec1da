//! Configuration and data directory management.
//!
//! Everything is driven by environment variables so the same binary can
//! run the webhook server, the ETL job, and the index rebuild against
//! the same data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Paths to all Agri-Sarthi data locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Knowledge database file (`data/knowledge.db`, override `DB_PATH`).
    pub knowledge_db: PathBuf,
    /// Vector collection directory (`data/vectordb/`, override `VECTOR_PATH`).
    pub vectordb: PathBuf,
    /// Embedding model directory (`data/models/`, override `EMBEDDING_MODEL`).
    pub model_dir: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            knowledge_db: std::env::var("DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| root.join("knowledge.db")),
            vectordb: std::env::var("VECTOR_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| root.join("vectordb")),
            model_dir: std::env::var("EMBEDDING_MODEL")
                .map(PathBuf::from)
                .unwrap_or_else(|_| root.join("models")),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(&self.vectordb)?;
        Ok(())
    }
}

/// Which retrieval pipeline answers queries.
///
/// The keyword slot-filler is the system of record; the embedding
/// retriever is the alternative selected via `RETRIEVAL_MODE=embedding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    Keyword,
    Embedding,
}

impl RetrievalMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Some(Self::Keyword),
            "embedding" => Some(Self::Embedding),
            _ => None,
        }
    }
}

/// Top-level Agri-Sarthi configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarthiConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Vector collection name.
    pub collection_name: String,
    /// Embedding dimension (384 for all-MiniLM-L6-v2).
    pub embedding_dim: usize,
    /// Retrieval pipeline selection.
    pub retrieval_mode: RetrievalMode,
    /// Base URL of the local LLM runtime (Ollama-compatible).
    pub llm_url: String,
    /// Model name served by the local runtime.
    pub llm_model: String,
    /// CPU threads handed to the local runtime.
    pub llm_threads: u32,
    /// Local speech-to-text endpoint, if any.
    pub stt_url: Option<String>,
    /// WhatsApp gateway endpoint, token, and sender id, if configured.
    pub whatsapp_api_url: Option<String>,
    pub whatsapp_api_token: Option<String>,
    pub whatsapp_sender_id: Option<String>,
}

impl SarthiConfig {
    /// Create configuration from environment and defaults.
    ///
    /// A set-but-unparseable `RETRIEVAL_MODE` is rejected rather than
    /// silently falling back to the keyword pipeline.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let data_paths = DataPaths::new(data_dir)?;

        let retrieval_mode = match std::env::var("RETRIEVAL_MODE") {
            Ok(raw) => RetrievalMode::parse(&raw)
                .ok_or_else(|| Error::Config(format!("invalid RETRIEVAL_MODE: {:?}", raw)))?,
            Err(_) => RetrievalMode::Keyword,
        };

        Ok(Self {
            port,
            data_paths,
            collection_name: std::env::var("COLLECTION_NAME")
                .unwrap_or_else(|_| "agri_sarthi_knowledge".into()),
            embedding_dim: 384,
            retrieval_mode,
            llm_url: std::env::var("LLM_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:11434".into()),
            llm_model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| "mistral:7b-instruct".into()),
            llm_threads: std::env::var("LLM_THREADS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(4),
            stt_url: std::env::var("STT_URL").ok(),
            whatsapp_api_url: std::env::var("WHATSAPP_API_URL").ok(),
            whatsapp_api_token: std::env::var("WHATSAPP_API_TOKEN").ok(),
            whatsapp_sender_id: std::env::var("WHATSAPP_SENDER_ID").ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_mode_parse() {
        assert_eq!(RetrievalMode::parse("keyword"), Some(RetrievalMode::Keyword));
        assert_eq!(RetrievalMode::parse(" Embedding "), Some(RetrievalMode::Embedding));
        assert_eq!(RetrievalMode::parse("hybrid"), None);
    }

    #[test]
    fn test_from_env_rejects_bad_retrieval_mode() {
        let dir = tempfile::TempDir::new().unwrap();

        std::env::set_var("RETRIEVAL_MODE", "hybrid");
        let err = SarthiConfig::from_env(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("RETRIEVAL_MODE"));

        std::env::set_var("RETRIEVAL_MODE", "embedding");
        let config = SarthiConfig::from_env(dir.path()).unwrap();
        assert_eq!(config.retrieval_mode, RetrievalMode::Embedding);

        std::env::remove_var("RETRIEVAL_MODE");
        let config = SarthiConfig::from_env(dir.path()).unwrap();
        assert_eq!(config.retrieval_mode, RetrievalMode::Keyword);
    }
}
