//! Response-shape tests — validates that webhook response JSON matches
//! what a WhatsApp gateway integration expects to consume.

/// Text responses carry { ok, answer }.
#[test]
fn test_text_response_shape() {
    let response = serde_json::json!({
        "ok": true,
        "answer": "गेहूं की पहली सिंचाई बुवाई के 20-25 दिन बाद करें।",
    });

    assert!(response["ok"].is_boolean());
    assert!(response["answer"].is_string());
    assert!(response.get("transcript").is_none());
}

/// Audio responses additionally carry the transcript, which may be
/// empty when transcription failed.
#[test]
fn test_audio_response_shape() {
    let response = serde_json::json!({
        "ok": true,
        "answer": "कृपया ध्यान दें: ऑफ़लाइन LLM उपलब्ध नहीं है।",
        "transcript": "",
    });

    assert!(response["ok"].is_boolean());
    assert!(response["answer"].is_string());
    assert!(response["transcript"].is_string());
}

/// Rejections carry { ok: false, error } and nothing else.
#[test]
fn test_error_response_shape() {
    let response = serde_json::json!({
        "ok": false,
        "error": "Unsupported content-type",
    });

    assert_eq!(response["ok"], false);
    assert!(response["error"].is_string());
    assert!(response.get("answer").is_none());
}
