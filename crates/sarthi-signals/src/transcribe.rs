//! Voice note transcription over a local STT HTTP endpoint.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    text: String,
}

/// Client for a whisper-style transcription service. Unconfigured or
/// failing transcription yields an empty transcript; the pipeline still
/// answers with whatever context it can build.
pub struct SpeechToText {
    client: reqwest::Client,
    url: Option<String>,
}

impl SpeechToText {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Transcribe Hindi audio bytes. Empty string on any failure.
    pub async fn transcribe(&self, audio: Vec<u8>) -> String {
        let Some(url) = &self.url else {
            return String::new();
        };
        if audio.is_empty() {
            return String::new();
        }

        let result = self
            .client
            .post(url)
            .header("content-type", "application/octet-stream")
            .body(audio)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<TranscriptResponse>().await {
                    Ok(body) => body.text.trim().to_string(),
                    Err(e) => {
                        warn!("Transcript parse failed: {}", e);
                        String::new()
                    }
                }
            }
            Ok(response) => {
                warn!("STT endpoint returned {}", response.status());
                String::new()
            }
            Err(e) => {
                warn!("STT request failed: {}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_returns_empty() {
        let stt = SpeechToText::new(None);
        assert!(!stt.is_configured());
        assert_eq!(stt.transcribe(vec![1, 2, 3]).await, "");
    }

    #[tokio::test]
    async fn test_empty_audio_returns_empty() {
        let stt = SpeechToText::new(Some("http://127.0.0.1:1".to_string()));
        assert_eq!(stt.transcribe(Vec::new()).await, "");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_returns_empty() {
        let stt = SpeechToText::new(Some("http://127.0.0.1:1".to_string()));
        assert_eq!(stt.transcribe(vec![0u8; 16]).await, "");
    }
}
