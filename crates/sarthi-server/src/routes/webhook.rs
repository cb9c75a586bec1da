//! POST /webhook — the WhatsApp entry point.
//!
//! Text messages arrive as JSON, voice notes as multipart form data.
//! The answer is returned in the HTTP response and relayed back over
//! WhatsApp in the background when a gateway is configured.

use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::state::AppState;

const DEFAULT_LOCATION: &str = "Jaipur, Rajasthan";
const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Incoming text message.
#[derive(Debug, Deserialize)]
pub struct WebhookText {
    pub from_number: String,
    pub message: String,
    #[serde(default)]
    pub location: Option<String>,
}

fn bad_request(error: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "ok": false, "error": error })),
    )
        .into_response()
}

pub async fn webhook(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("application/json") {
        return handle_text(state, request).await;
    }
    if content_type.starts_with("multipart/form-data") {
        return handle_audio(state, request).await;
    }
    bad_request("Unsupported content-type")
}

async fn handle_text(state: Arc<AppState>, request: Request) -> Response {
    let bytes = match axum::body::to_bytes(request.into_body(), BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return bad_request("Could not read body");
        }
    };

    let payload: WebhookText = match serde_json::from_slice(&bytes) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Malformed webhook JSON: {}", e);
            return bad_request("Malformed JSON payload");
        }
    };

    let query = payload.message.trim().to_string();
    let location = payload
        .location
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    info!("Text message from {}", payload.from_number);

    let answer = state.answer(&query, &location).await;
    relay_in_background(state, payload.from_number, answer.clone());

    Json(json!({ "ok": true, "answer": answer })).into_response()
}

async fn handle_audio(state: Arc<AppState>, request: Request) -> Response {
    let mut multipart = match Multipart::from_request(request, &()).await {
        Ok(multipart) => multipart,
        Err(e) => {
            warn!("Malformed multipart request: {}", e);
            return bad_request("Malformed multipart payload");
        }
    };

    let mut from_number = String::new();
    let mut location = DEFAULT_LOCATION.to_string();
    let mut audio: Vec<u8> = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("from_number") => {
                if let Ok(value) = field.text().await {
                    from_number = value;
                }
            }
            Some("location") => {
                if let Ok(value) = field.text().await {
                    if !value.is_empty() {
                        location = value;
                    }
                }
            }
            Some("audio") => {
                if let Ok(bytes) = field.bytes().await {
                    audio = bytes.to_vec();
                }
            }
            _ => {}
        }
    }

    info!("Voice note from {} ({} bytes)", from_number, audio.len());

    let transcript = state.stt.transcribe(audio).await;
    let answer = state.answer(&transcript, &location).await;
    relay_in_background(state, from_number, answer.clone());

    Json(json!({ "ok": true, "answer": answer, "transcript": transcript })).into_response()
}

/// Deliver the answer over WhatsApp without blocking the response.
fn relay_in_background(state: Arc<AppState>, to_number: String, answer: String) {
    if !state.relay.is_configured() {
        return;
    }
    tokio::spawn(async move {
        state.relay.send_text(&to_number, &answer).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use sarthi_chat::NoopGenerator;
    use sarthi_core::{DataPaths, RetrievalMode, SarthiConfig};
    use sarthi_retrieve::KeywordRetriever;
    use sarthi_signals::{MarketService, SpeechToText, WeatherService, WhatsAppRelay};
    use sarthi_store::{run_etl, KnowledgeStore};
    use tempfile::TempDir;

    fn test_state(dir: &TempDir) -> Arc<AppState> {
        let root = dir.path().to_path_buf();
        let config = SarthiConfig {
            port: 0,
            data_paths: DataPaths {
                knowledge_db: root.join("knowledge.db"),
                vectordb: root.join("vectordb"),
                model_dir: root.join("models"),
                root,
            },
            collection_name: "agri_sarthi_knowledge".into(),
            embedding_dim: 384,
            retrieval_mode: RetrievalMode::Keyword,
            llm_url: "http://127.0.0.1:1".into(),
            llm_model: "mistral:7b-instruct".into(),
            llm_threads: 1,
            stt_url: None,
            whatsapp_api_url: None,
            whatsapp_api_token: None,
            whatsapp_sender_id: None,
        };

        let store = Arc::new(KnowledgeStore::open(&config.data_paths.knowledge_db).unwrap());
        run_etl(&store).unwrap();

        // Unroutable signal endpoints so external lookups fail fast
        let retriever = Arc::new(KeywordRetriever::new(
            store,
            WeatherService::new("http://127.0.0.1:1"),
            MarketService::new("http://127.0.0.1:1"),
        ));

        Arc::new(AppState::new(
            config,
            retriever,
            Arc::new(NoopGenerator),
            WhatsAppRelay::disabled(),
            SpeechToText::new(None),
        ))
    }

    fn json_request(payload: serde_json::Value) -> Request {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_text_message_answers_with_context() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let request = json_request(serde_json::json!({
            "from_number": "+919999999999",
            "message": "सरसों के लिए सिंचाई?",
        }));

        let response = webhook(State(state), request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["ok"], true);

        // NoopGenerator forces the Hindi template; retrieved context rides along
        let answer = body["answer"].as_str().unwrap();
        assert!(answer.contains("सरसों के लिए सिंचाई?"));
        assert!(answer.contains("Crop: Mustard"));
    }

    #[tokio::test]
    async fn test_text_message_defaults_location() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let request = json_request(serde_json::json!({
            "from_number": "+919999999999",
            "message": "wheat sowing time",
        }));

        let response = webhook(State(state), request).await;
        let body = response_json(response).await;
        assert!(body["answer"]
            .as_str()
            .unwrap()
            .contains("Location: Jaipur, Rajasthan"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = webhook(State(state), request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_unsupported_content_type_is_rejected() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("सरसों"))
            .unwrap();

        let response = webhook(State(state), request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["error"], "Unsupported content-type");
    }

    #[tokio::test]
    async fn test_audio_without_stt_yields_empty_transcript() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let boundary = "test-boundary";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"from_number\"\r\n\r\n\
             +919999999999\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"location\"\r\n\r\n\
             Jaipur\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"audio\"; filename=\"note.ogg\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             fake-ogg-bytes\r\n\
             --{b}--\r\n",
            b = boundary
        );

        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();

        let response = webhook(State(state), request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["transcript"], "");
        // Pipeline still answers on the empty query
        assert!(!json["answer"].as_str().unwrap().is_empty());
    }
}
