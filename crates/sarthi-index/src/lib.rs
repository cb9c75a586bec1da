//! Agri-Sarthi Index — the semantic search layer.
//!
//! Knowledge rows from the structured store are flattened into
//! single-line documents, embedded, and kept in a vector collection
//! (a standalone SQLite file) that serves cosine top-k search.

pub mod builder;
pub mod collection;
pub mod formatter;
pub mod quant;

pub use builder::{collect_documents, rebuild_index, FlatDocument, IndexReport};
pub use collection::{SearchHit, VectorCollection, VectorDocument};
pub use formatter::flatten_row;
