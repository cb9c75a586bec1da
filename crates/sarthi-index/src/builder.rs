//! Index build pipeline: structured store → flattened docs → embeddings.

use tracing::{info, warn};

use sarthi_core::{Error, Result};
use sarthi_infer::EmbedderBackend;
use sarthi_store::KnowledgeStore;

use crate::collection::{VectorCollection, VectorDocument};
use crate::formatter::flatten_row;

/// Documents are embedded and inserted in batches of this size.
const BATCH_SIZE: usize = 100;

/// Summary of one index rebuild.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    pub tables: usize,
    pub documents: usize,
}

/// A flattened document awaiting embedding.
#[derive(Debug, Clone)]
pub struct FlatDocument {
    pub id: String,
    pub text: String,
    pub source: String,
}

/// Walk every table in the store and flatten every row.
///
/// Ids are synthetic (`{table}_{n}`) so rebuilds never collide with
/// stale entries from a previous schema.
pub fn collect_documents(store: &KnowledgeStore) -> Result<Vec<FlatDocument>> {
    let mut docs = Vec::new();
    let mut tables = 0usize;

    for table in store.list_tables()? {
        let dump = match store.dump_table(&table) {
            Ok(dump) => dump,
            Err(e) => {
                warn!("Could not read table {}: {}", table, e);
                continue;
            }
        };
        tables += 1;

        for (n, row) in dump.rows.iter().enumerate() {
            docs.push(FlatDocument {
                id: format!("{}_{}", table, n),
                text: flatten_row(&table, &dump.columns, row),
                source: table.clone(),
            });
        }
    }

    info!("Collected {} documents from {} tables", docs.len(), tables);
    Ok(docs)
}

/// Rebuild the vector collection from scratch.
///
/// Clears the existing collection, then embeds and inserts every
/// flattened row. Fails rather than silently leaving a stale index when
/// the store is empty or the embedder has no model loaded.
pub fn rebuild_index(
    store: &KnowledgeStore,
    collection: &VectorCollection,
    embedder: &dyn EmbedderBackend,
) -> Result<IndexReport> {
    let docs = collect_documents(store)?;
    if docs.is_empty() {
        return Err(Error::Index(
            "no documents loaded from knowledge store, aborting index build".to_string(),
        ));
    }

    if !embedder.is_available() {
        return Err(Error::Inference(
            "embedding model unavailable, cannot build index".to_string(),
        ));
    }

    let tables = docs
        .iter()
        .map(|d| d.source.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();

    collection.clear()?;

    let mut indexed = 0usize;
    for batch in docs.chunks(BATCH_SIZE) {
        let texts: Vec<&str> = batch.iter().map(|d| d.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts);

        let mut staged = Vec::with_capacity(batch.len());
        for (doc, embedding) in batch.iter().zip(embeddings.into_iter()) {
            match embedding {
                Some(embedding) => staged.push(VectorDocument {
                    id: doc.id.clone(),
                    document: doc.text.clone(),
                    source: doc.source.clone(),
                    embedding,
                }),
                None => warn!("Embedding failed for {}, skipping", doc.id),
            }
        }
        collection.add_batch(&staged)?;
        indexed += staged.len();
        info!("Indexed {}/{} documents", indexed, docs.len());
    }

    Ok(IndexReport {
        tables,
        documents: indexed,
    })
}
