//! Persistent vector collection backed by its own SQLite file.
//!
//! One collection = one `{name}.db` under the vector directory.
//! Embeddings are stored uint8-quantized; an in-memory row-normalized
//! matrix serves cosine top-k via a single dot product.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Axis};
use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::debug;

use sarthi_core::{Error, Result};

use crate::quant::{dequantize_uint8, quantize_uint8};

const COLLECTION_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id          TEXT PRIMARY KEY,
    document    TEXT NOT NULL,
    source      TEXT NOT NULL,
    embedding   BLOB NOT NULL,
    scale       REAL NOT NULL,
    offset_val  REAL NOT NULL
);
";

/// A document staged for insertion.
#[derive(Debug, Clone)]
pub struct VectorDocument {
    pub id: String,
    pub document: String,
    pub source: String,
    pub embedding: Array1<f32>,
}

/// One search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub document: String,
    pub source: String,
    pub score: f64,
}

struct EmbeddingMatrix {
    matrix: Array2<f32>,
    ids: Vec<String>,
    dirty: bool,
}

/// Vector collection with persistent storage and in-memory search.
pub struct VectorCollection {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    dim: usize,
    matrix: Mutex<EmbeddingMatrix>,
}

impl VectorCollection {
    /// Open (or create) the collection named `name` under `dir`.
    pub fn open(dir: &Path, name: &str, dim: usize) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let db_path = dir.join(format!("{}.db", name));

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(COLLECTION_SCHEMA)
            .map_err(|e| Error::Database(e.to_string()))?;

        let collection = Self {
            conn: Mutex::new(conn),
            db_path,
            dim,
            matrix: Mutex::new(EmbeddingMatrix {
                matrix: Array2::zeros((0, dim)),
                ids: Vec::new(),
                dirty: true,
            }),
        };
        collection.load_matrix()?;
        Ok(collection)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Number of stored documents.
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every stored document. The next search reloads an empty matrix.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM documents", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        drop(conn);
        self.matrix.lock().dirty = true;
        Ok(())
    }

    /// Insert a batch of documents in one transaction.
    pub fn add_batch(&self, docs: &[VectorDocument]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        for doc in docs {
            let (bytes, scale, offset) = quantize_uint8(&doc.embedding);
            tx.execute(
                "INSERT OR REPLACE INTO documents (id, document, source, embedding, scale, offset_val) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    doc.id,
                    doc.document,
                    doc.source,
                    bytes,
                    scale as f64,
                    offset as f64
                ],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;
        drop(conn);
        self.matrix.lock().dirty = true;
        Ok(())
    }

    fn load_matrix(&self) -> Result<()> {
        let mut ids = Vec::new();
        let mut embeddings: Vec<Array1<f32>> = Vec::new();

        {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare("SELECT id, embedding, scale, offset_val FROM documents")
                .map_err(|e| Error::Database(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| {
                    let id: String = row.get(0)?;
                    let blob: Vec<u8> = row.get(1)?;
                    let scale: f64 = row.get(2)?;
                    let offset: f64 = row.get(3)?;
                    Ok((id, blob, scale as f32, offset as f32))
                })
                .map_err(|e| Error::Database(e.to_string()))?;

            for row in rows {
                let (id, blob, scale, offset) =
                    row.map_err(|e| Error::Database(e.to_string()))?;
                ids.push(id);
                embeddings.push(dequantize_uint8(&blob, scale, offset));
            }
        }

        let mut mat = self.matrix.lock();
        if embeddings.is_empty() {
            mat.matrix = Array2::zeros((0, self.dim));
            mat.ids = Vec::new();
            mat.dirty = false;
            return Ok(());
        }

        let n = embeddings.len();
        let mut matrix = Array2::zeros((n, self.dim));
        for (i, emb) in embeddings.iter().enumerate() {
            if emb.len() != self.dim {
                return Err(Error::Index(format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    self.dim,
                    emb.len()
                )));
            }
            matrix.row_mut(i).assign(emb);
        }

        // Normalize rows so cosine similarity is a dot product
        for mut row in matrix.rows_mut() {
            let norm = row.dot(&row).sqrt();
            if norm > 1e-9 {
                row /= norm;
            }
        }

        mat.matrix = matrix;
        mat.ids = ids;
        mat.dirty = false;
        debug!("Loaded {} documents into search matrix", n);
        Ok(())
    }

    fn ensure_matrix_loaded(&self) -> Result<()> {
        if self.matrix.lock().dirty {
            self.load_matrix()?;
        }
        Ok(())
    }

    /// Cosine top-k search over all stored documents.
    pub fn search(&self, query_embedding: &Array1<f32>, top_k: usize) -> Result<Vec<SearchHit>> {
        self.ensure_matrix_loaded()?;

        let mat = self.matrix.lock();
        if mat.matrix.nrows() == 0 {
            return Ok(Vec::new());
        }

        let q_norm = query_embedding.dot(query_embedding).sqrt();
        if q_norm < 1e-9 {
            return Ok(Vec::new());
        }
        let q = query_embedding / q_norm;

        let similarities = mat.matrix.dot(&q);

        let k = top_k.min(similarities.len());
        let mut indexed: Vec<(usize, f32)> = similarities
            .iter()
            .enumerate()
            .map(|(i, &s)| (i, s))
            .collect();
        indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        indexed.truncate(k);

        let top_ids: Vec<(String, f64)> = indexed
            .iter()
            .map(|&(i, s)| (mat.ids[i].clone(), s as f64))
            .collect();
        drop(mat);

        let conn = self.conn.lock();
        let mut results = Vec::with_capacity(k);
        for (id, score) in top_ids {
            let row = conn
                .query_row(
                    "SELECT document, source FROM documents WHERE id = ?1",
                    [&id],
                    |row| {
                        let document: String = row.get(0)?;
                        let source: String = row.get(1)?;
                        Ok((document, source))
                    },
                )
                .map_err(|e| Error::Database(e.to_string()))?;
            results.push(SearchHit {
                id,
                document: row.0,
                source: row.1,
                score,
            });
        }
        Ok(results)
    }
}
