//! Shared application state and the answer pipeline.

use std::sync::Arc;

use tracing::{info, warn};

use sarthi_chat::{build_prompt, fallback_answer, GeneratorBackend, OllamaGenerator};
use sarthi_core::{Result, RetrievalMode, SarthiConfig};
use sarthi_index::VectorCollection;
use sarthi_infer::create_embedder;
use sarthi_retrieve::{EmbeddingRetriever, KeywordRetriever, Retriever};
use sarthi_signals::{MarketService, SpeechToText, WeatherService, WhatsAppRelay};
use sarthi_store::KnowledgeStore;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: SarthiConfig,
    pub retriever: Arc<dyn Retriever>,
    pub generator: Arc<dyn GeneratorBackend>,
    pub relay: WhatsAppRelay,
    pub stt: SpeechToText,
}

impl AppState {
    /// Assemble state from explicit components. Tests use this with
    /// stub services.
    pub fn new(
        config: SarthiConfig,
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn GeneratorBackend>,
        relay: WhatsAppRelay,
        stt: SpeechToText,
    ) -> Self {
        Self {
            config,
            retriever,
            generator,
            relay,
            stt,
        }
    }

    /// Wire up the full production state from configuration.
    pub fn from_config(config: SarthiConfig) -> Result<Self> {
        let retriever: Arc<dyn Retriever> = match config.retrieval_mode {
            RetrievalMode::Keyword => {
                let store = Arc::new(KnowledgeStore::open(&config.data_paths.knowledge_db)?);
                Arc::new(KeywordRetriever::new(
                    store,
                    WeatherService::default(),
                    MarketService::default(),
                ))
            }
            RetrievalMode::Embedding => {
                let embedder = create_embedder(&config.data_paths.model_dir);
                let collection = Arc::new(VectorCollection::open(
                    &config.data_paths.vectordb,
                    &config.collection_name,
                    config.embedding_dim,
                )?);
                Arc::new(EmbeddingRetriever::new(embedder, collection))
            }
        };
        info!("Retrieval mode: {:?}", config.retrieval_mode);

        let generator: Arc<dyn GeneratorBackend> = Arc::new(OllamaGenerator::new(
            config.llm_url.clone(),
            config.llm_model.clone(),
            Some(config.llm_threads),
        ));

        let relay = WhatsAppRelay::new(
            config.whatsapp_api_url.clone(),
            config.whatsapp_api_token.clone(),
            config.whatsapp_sender_id.clone(),
        );
        if !relay.is_configured() {
            info!("WhatsApp relay not configured, outbound delivery disabled");
        }

        let stt = SpeechToText::new(config.stt_url.clone());

        Ok(Self::new(config, retriever, generator, relay, stt))
    }

    /// Full question-to-answer pipeline: retrieve context, prompt the
    /// model, fall back to the Hindi template when generation fails.
    pub async fn answer(&self, query: &str, location: &str) -> String {
        let retrieved = self.retriever.retrieve(query, location).await;
        let prompt = build_prompt(&retrieved.context, query);

        match self.generator.generate(&prompt).await {
            Some(answer) => answer,
            None => {
                warn!("Generation failed, serving template answer");
                fallback_answer(query, &retrieved.context)
            }
        }
    }
}
