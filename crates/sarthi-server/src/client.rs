//! CLI client for poking a running webhook server.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde_json::json;

/// POST a text question and print the response.
pub async fn send_text(
    url: &str,
    message: &str,
    from_number: &str,
    location: &str,
) -> anyhow::Result<()> {
    let payload = json!({
        "from_number": from_number,
        "message": message,
        "location": location,
    });

    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .json(&payload)
        .timeout(Duration::from_secs(20))
        .send()
        .await
        .context("webhook request failed")?;

    print_response(response).await
}

/// POST an audio file as multipart and print the response.
pub async fn send_audio(
    url: &str,
    file: &Path,
    from_number: &str,
    location: &str,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("could not read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());

    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(filename)
        .mime_str("application/octet-stream")?;
    let form = reqwest::multipart::Form::new()
        .text("from_number", from_number.to_string())
        .text("location", location.to_string())
        .part("audio", part);

    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .multipart(form)
        .timeout(Duration::from_secs(60))
        .send()
        .await
        .context("webhook request failed")?;

    print_response(response).await
}

async fn print_response(response: reqwest::Response) -> anyhow::Result<()> {
    let status = response.status();
    println!("Status: {}", status);

    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        bail!("server returned {}", status);
    }
    Ok(())
}
