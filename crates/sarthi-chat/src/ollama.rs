//! Local model serving over the Ollama generate API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generator::GeneratorBackend;

const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Decoding parameters tuned for short factual Hindi answers.
const TEMPERATURE: f32 = 0.4;
const TOP_P: f32 = 0.9;
const MAX_NEW_TOKENS: i32 = 256;

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_thread: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Non-streaming client for a local Ollama server.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    threads: Option<u32>,
}

impl OllamaGenerator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, threads: Option<u32>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            threads,
        }
    }
}

#[async_trait]
impl GeneratorBackend for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Option<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                num_predict: MAX_NEW_TOKENS,
                num_thread: self.threads,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(GENERATE_TIMEOUT)
            .send()
            .await
            .map_err(|e| warn!("LLM request failed: {}", e))
            .ok()?;

        if !response.status().is_success() {
            warn!("LLM server returned {}", response.status());
            return None;
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| warn!("LLM response parse failed: {}", e))
            .ok()?;

        let answer = body.response.trim().to_string();
        if answer.is_empty() {
            None
        } else {
            Some(answer)
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_returns_none() {
        let generator = OllamaGenerator::new("http://127.0.0.1:1", "mistral:7b-instruct", Some(4));
        assert!(generator.generate("[INST] test [/INST]").await.is_none());
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            model: "mistral:7b-instruct".into(),
            prompt: "p".into(),
            stream: false,
            options: GenerateOptions {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                num_predict: MAX_NEW_TOKENS,
                num_thread: None,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 256);
        assert!(json["options"].get("num_thread").is_none());
    }
}
