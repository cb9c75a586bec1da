//! Small LRU cache for query embeddings.
//!
//! Farmers tend to repeat the same handful of questions, so caching the
//! query-side encoding saves an inference pass per repeat.

use std::collections::HashMap;

use ndarray::Array1;
use parking_lot::Mutex;

/// Thread-safe LRU cache keyed by query text.
pub struct QueryCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<String, Array1<f32>>,
    order: Vec<String>,
    max_size: usize,
}

impl QueryCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size),
                order: Vec::with_capacity(max_size),
                max_size,
            }),
        }
    }

    /// Get a cached embedding, refreshing its recency.
    pub fn get(&self, query: &str) -> Option<Array1<f32>> {
        let mut inner = self.inner.lock();
        let embedding = inner.entries.get(query)?.clone();
        if let Some(pos) = inner.order.iter().position(|k| k == query) {
            let key = inner.order.remove(pos);
            inner.order.push(key);
        }
        Some(embedding)
    }

    /// Insert an embedding, evicting the least recently used entry at capacity.
    pub fn put(&self, query: String, embedding: Array1<f32>) {
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(&query) {
            inner.entries.insert(query.clone(), embedding);
            inner.order.retain(|k| k != &query);
            inner.order.push(query);
            return;
        }

        while inner.entries.len() >= inner.max_size && !inner.order.is_empty() {
            let oldest = inner.order.remove(0);
            inner.entries.remove(&oldest);
        }

        inner.order.push(query.clone());
        inner.entries.insert(query, embedding);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(512)
    }
}
