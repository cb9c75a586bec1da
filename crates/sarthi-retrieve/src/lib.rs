//! Agri-Sarthi Retrieve — turns a farmer's question into prompt context.
//!
//! Two interchangeable strategies behind one trait. The keyword
//! retriever is the system of record: it detects the crop from
//! synonyms, pulls the structured row, and folds in live weather and
//! mandi prices. The embedding retriever serves raw top-k documents
//! from the vector index and is selected via `RETRIEVAL_MODE`.

pub mod embedding;
pub mod keyword;
pub mod types;

pub use embedding::EmbeddingRetriever;
pub use keyword::{detect_crop, wants_pest_advice, KeywordRetriever};
pub use types::{RetrievedContext, Retriever};
