//! Outbound WhatsApp delivery through a configured gateway.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::signal::Signal;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fire-and-forget relay. When the gateway URL or sender id is unset
/// the relay is a no-op; delivery failures are logged and swallowed.
pub struct WhatsAppRelay {
    client: reqwest::Client,
    api_url: Option<String>,
    api_token: Option<String>,
    sender_id: Option<String>,
}

impl WhatsAppRelay {
    pub fn new(
        api_url: Option<String>,
        api_token: Option<String>,
        sender_id: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_token,
            sender_id,
        }
    }

    /// Unconfigured relay, used in tests and CLI runs.
    pub fn disabled() -> Self {
        Self::new(None, None, None)
    }

    pub fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.sender_id.is_some()
    }

    /// Deliver `text` to `to_number`. The answer has already been
    /// returned over HTTP; this is best-effort only.
    pub async fn send_text(&self, to_number: &str, text: &str) -> Signal<()> {
        let (Some(api_url), Some(sender_id)) = (&self.api_url, &self.sender_id) else {
            return Signal::Unavailable;
        };

        let payload = json!({
            "from": sender_id,
            "to": to_number,
            "message": text,
        });

        let mut request = self
            .client
            .post(api_url)
            .json(&payload)
            .timeout(REQUEST_TIMEOUT);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => {
                debug!("WhatsApp relay responded {}", response.status());
                Signal::Value(())
            }
            Err(e) => {
                warn!("WhatsApp relay failed: {}", e);
                Signal::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_relay_is_noop() {
        let relay = WhatsAppRelay::disabled();
        assert!(!relay.is_configured());
        let signal = relay.send_text("+919999999999", "नमस्ते").await;
        assert_eq!(signal, Signal::Unavailable);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let relay = WhatsAppRelay::new(
            Some("http://127.0.0.1:1".to_string()),
            Some("token".to_string()),
            Some("sender".to_string()),
        );
        assert!(relay.is_configured());
        let signal = relay.send_text("+919999999999", "नमस्ते").await;
        assert!(matches!(signal, Signal::Failed(_)));
    }
}
