//! Keyword-driven context orchestration.
//!
//! Mirrors how farmers actually phrase questions: crop names appear in
//! English, Devanagari, or roman Hindi. Detection is a lowercase
//! substring scan, which is crude but covers the supported crops well.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use sarthi_signals::{MarketService, Signal, WeatherService, WeatherSnapshot};
use sarthi_store::{KnowledgeStore, PestRecord};

use crate::types::{RetrievedContext, Retriever};

/// Synonyms mapping to canonical crop names.
const CROP_SYNONYMS: &[(&str, &[&str])] = &[
    ("Wheat", &["wheat", "गेहूं", "gehun", "gehu"]),
    ("Mustard", &["mustard", "सरसों", "sarson"]),
];

/// Keywords that trigger inclusion of pest advisories.
const PEST_KEYWORDS: &[&str] = &["pest", "disease", "कीड़ा", "रोग", "बीमारी"];

/// Map a question to a canonical crop name, if any synonym appears.
pub fn detect_crop(query: &str) -> Option<&'static str> {
    let query_lower = query.to_lowercase();
    for &(canonical, synonyms) in CROP_SYNONYMS {
        if synonyms.iter().any(|s| query_lower.contains(s)) {
            return Some(canonical);
        }
    }
    None
}

/// Whether the question asks about pests or disease.
pub fn wants_pest_advice(query: &str) -> bool {
    let query_lower = query.to_lowercase();
    PEST_KEYWORDS.iter().any(|k| query_lower.contains(k))
}

fn join_fields(fields: &[(&'static str, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_pests(pests: &[PestRecord]) -> String {
    pests
        .iter()
        .map(|p| {
            format!(
                "{}: symptoms={}; management={}",
                p.pest_name, p.symptoms, p.management_advice
            )
        })
        .collect::<Vec<_>>()
        .join(" || ")
}

/// The default retriever: structured lookups plus live signals.
pub struct KeywordRetriever {
    store: Arc<KnowledgeStore>,
    weather: WeatherService,
    market: MarketService,
}

impl KeywordRetriever {
    pub fn new(store: Arc<KnowledgeStore>, weather: WeatherService, market: MarketService) -> Self {
        Self {
            store,
            weather,
            market,
        }
    }
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn retrieve(&self, query: &str, location: &str) -> RetrievedContext {
        let crop = detect_crop(query);
        let include_pests = wants_pest_advice(query);
        debug!(?crop, include_pests, "Keyword retrieval");

        let mut parts = vec![format!("User: {}", query), format!("Location: {}", location)];
        if let Some(crop) = crop {
            parts.push(format!("Crop: {}", crop));
        }

        if let Some(crop) = crop {
            if let Ok(Some(record)) = self.store.lookup_crop(crop, location) {
                parts.push(format!("Crop Info: {}", join_fields(&record.context_fields())));
            }
        }

        let weather = match self.weather.fetch(location).await {
            Signal::Value(snapshot) => snapshot,
            _ => WeatherSnapshot::unknown(location),
        };
        parts.push(format!("Weather: {}", join_fields(&weather.context_fields())));

        if let Some(crop) = crop {
            let price = self.market.fetch(crop).await;
            parts.push(format!(
                "Market Price: {}",
                join_fields(&price.context_fields())
            ));

            if include_pests {
                if let Ok(pests) = self.store.lookup_pests(crop) {
                    if !pests.is_empty() {
                        parts.push(format!("Pest Advice: {}", format_pests(&pests)));
                    }
                }
            }
        }

        RetrievedContext {
            context: parts.join(" | "),
            crop: crop.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sarthi_store::run_etl;
    use tempfile::TempDir;

    #[test]
    fn test_detect_crop_synonyms() {
        assert_eq!(detect_crop("When to sow wheat?"), Some("Wheat"));
        assert_eq!(detect_crop("गेहूं की सिंचाई कब करें?"), Some("Wheat"));
        assert_eq!(detect_crop("gehun ka rate"), Some("Wheat"));
        assert_eq!(detect_crop("सरसों के लिए सिंचाई?"), Some("Mustard"));
        assert_eq!(detect_crop("sarson mandi bhav"), Some("Mustard"));
        assert_eq!(detect_crop("धान की खेती"), None);
    }

    #[test]
    fn test_detect_crop_case_insensitive() {
        assert_eq!(detect_crop("WHEAT price today"), Some("Wheat"));
        assert_eq!(detect_crop("Mustard oil"), Some("Mustard"));
    }

    #[test]
    fn test_pest_keywords() {
        assert!(wants_pest_advice("wheat में कीड़ा लगा है"));
        assert!(wants_pest_advice("mustard disease problem"));
        assert!(wants_pest_advice("गेहूं में रोग"));
        assert!(!wants_pest_advice("गेहूं की सिंचाई कब करें?"));
    }

    fn test_retriever(dir: &TempDir) -> KeywordRetriever {
        let store = Arc::new(KnowledgeStore::open(dir.path().join("knowledge.db")).unwrap());
        run_etl(&store).unwrap();
        // Unroutable endpoints so signals fail fast and degrade
        KeywordRetriever::new(
            store,
            WeatherService::new("http://127.0.0.1:1"),
            MarketService::new("http://127.0.0.1:1"),
        )
    }

    #[tokio::test]
    async fn test_retrieve_crop_context() {
        let dir = TempDir::new().unwrap();
        let retriever = test_retriever(&dir);

        let retrieved = retriever
            .retrieve("सरसों के लिए सिंचाई?", "Jaipur, Rajasthan")
            .await;

        assert_eq!(retrieved.crop.as_deref(), Some("Mustard"));
        assert!(retrieved.context.starts_with("User: सरसों के लिए सिंचाई?"));
        assert!(retrieved.context.contains("Crop: Mustard"));
        assert!(retrieved.context.contains("Crop Info:"));
        assert!(retrieved.context.contains("irrigation_schedule="));
        // Market scrape fails, seeded fallback applies
        assert!(retrieved.context.contains("price_inr_per_quintal=5400"));
        // Weather failed; only the location field survives
        assert!(retrieved.context.contains("Weather: location=Jaipur, Rajasthan"));
        assert!(!retrieved.context.contains("Pest Advice:"));
    }

    #[tokio::test]
    async fn test_retrieve_includes_pest_advice() {
        let dir = TempDir::new().unwrap();
        let retriever = test_retriever(&dir);

        let retrieved = retriever
            .retrieve("सरसों में कीड़ा लगा है, क्या करूं?", "Jaipur")
            .await;

        assert_eq!(retrieved.crop.as_deref(), Some("Mustard"));
        assert!(retrieved.context.contains("Pest Advice:"));
        assert!(retrieved.context.contains("White Grub"));
    }

    #[tokio::test]
    async fn test_retrieve_without_crop() {
        let dir = TempDir::new().unwrap();
        let retriever = test_retriever(&dir);

        let retrieved = retriever.retrieve("मौसम कैसा रहेगा?", "Jaipur").await;

        assert!(retrieved.crop.is_none());
        assert!(!retrieved.context.contains("Crop:"));
        assert!(!retrieved.context.contains("Market Price:"));
        assert!(retrieved.context.contains("Weather:"));
    }
}
