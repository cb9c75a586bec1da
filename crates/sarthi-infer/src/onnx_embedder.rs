//! ONNX embedding backend for all-MiniLM-L6-v2.
//!
//! Loads a SentenceTransformers export (`model.onnx` + `tokenizer.json`)
//! and serves 384-dim embeddings with mean pooling. Requires the `onnx`
//! feature and, with load-dynamic, `ORT_DYLIB_PATH` pointing at
//! libonnxruntime.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;

    use ndarray::Array1;
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::Tokenizer;
    use tracing::{info, warn};

    use crate::cache::QueryCache;
    use crate::embedder::EmbedderBackend;
    use crate::EMBEDDING_DIM;

    /// Maximum token sequence length fed to the model.
    const MAX_SEQ_LEN: usize = 256;

    /// ONNX embedding backend.
    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        cache: QueryCache,
    }

    impl OnnxEmbedder {
        /// Load the model and tokenizer from `model_dir`.
        pub fn load(model_dir: &Path) -> Result<Self, String> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(format!("model not found: {}", model_path.display()));
            }
            if !tokenizer_path.exists() {
                return Err(format!("tokenizer not found: {}", tokenizer_path.display()));
            }

            ort::init().commit();

            let session = Session::builder()
                .map_err(|e| format!("session builder failed: {}", e))?
                .with_intra_threads(2)
                .map_err(|e| format!("thread config failed: {}", e))?
                .commit_from_file(&model_path)
                .map_err(|e| format!("model load failed: {}", e))?;

            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| format!("tokenizer load failed: {}", e))?;

            info!("ONNX embedder loaded from {}", model_dir.display());

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                cache: QueryCache::default(),
            })
        }

        fn infer(&self, text: &str) -> Option<Array1<f32>> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| warn!("tokenization failed: {}", e))
                .ok()?;

            let seq_len = encoding.get_ids().len().min(MAX_SEQ_LEN);
            let ids: Vec<i64> = encoding.get_ids()[..seq_len]
                .iter()
                .map(|&id| id as i64)
                .collect();
            let mask: Vec<i64> = encoding.get_attention_mask()[..seq_len]
                .iter()
                .map(|&m| m as i64)
                .collect();
            let type_ids: Vec<i64> = vec![0; seq_len];

            let ids_tensor = Tensor::from_array(([1usize, seq_len], ids))
                .map_err(|e| warn!("ids tensor failed: {}", e))
                .ok()?;
            let mask_tensor = Tensor::from_array(([1usize, seq_len], mask.clone()))
                .map_err(|e| warn!("mask tensor failed: {}", e))
                .ok()?;
            let type_ids_tensor = Tensor::from_array(([1usize, seq_len], type_ids))
                .map_err(|e| warn!("type_ids tensor failed: {}", e))
                .ok()?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_ids_tensor])
                .map_err(|e| warn!("ONNX inference failed: {}", e))
                .ok()?;

            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| warn!("output extraction failed: {}", e))
                .ok()?;
            let dims: Vec<i64> = shape.iter().copied().collect();

            match dims.len() {
                // Token embeddings [1, seq_len, dim]: mean-pool over the mask
                3 => {
                    let dim = dims[2] as usize;
                    let mask_sum: i64 = mask.iter().sum();
                    if mask_sum == 0 {
                        return None;
                    }
                    let mut pooled = Array1::zeros(dim);
                    for (i, &m) in mask.iter().enumerate() {
                        if m > 0 {
                            let offset = i * dim;
                            for d in 0..dim {
                                pooled[d] += data[offset + d];
                            }
                        }
                    }
                    Some(pooled / mask_sum as f32)
                }
                // Already pooled [1, dim]
                2 => {
                    let dim = dims[1] as usize;
                    Some(Array1::from_vec(data[..dim].to_vec()))
                }
                _ => {
                    warn!("unexpected output shape: {:?}", dims);
                    None
                }
            }
        }
    }

    impl EmbedderBackend for OnnxEmbedder {
        fn embed(&self, text: &str) -> Option<Array1<f32>> {
            if let Some(cached) = self.cache.get(text) {
                return Some(cached);
            }
            let embedding = self.infer(text)?;
            self.cache.put(text.to_string(), embedding.clone());
            Some(embedding)
        }

        fn dimension(&self) -> usize {
            EMBEDDING_DIM
        }

        fn is_available(&self) -> bool {
            true
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxEmbedder;
