//! Transport to the remote extraction service.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use taller_core::config::ExtractionConfig;

use crate::contract::{ExtractionRequest, ExtractionResponse};
use crate::error::DictationError;

/// Sends extraction requests to the text-understanding service.
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// POST `request` to `endpoint` (relative to the service base URL).
    ///
    /// Transport and HTTP failures map to `DictationError::Transport`.
    async fn extract(
        &self,
        endpoint: &str,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, DictationError>;
}

/// JSON-over-HTTP extraction client.
#[derive(Debug, Clone)]
pub struct HttpExtractionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExtractionClient {
    pub fn new(config: &ExtractionConfig) -> Result<Self, DictationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                DictationError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl ExtractionClient for HttpExtractionClient {
    async fn extract(
        &self,
        endpoint: &str,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, DictationError> {
        let url = self.url_for(endpoint);
        tracing::debug!(url = %url, text_len = request.texto.len(), "Sending extraction request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Extraction request failed");
                DictationError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message_from_body(&body)
                .unwrap_or_else(|| format!("HTTP {}", status));
            tracing::warn!(url = %url, status = %status, error = %message, "Extraction service returned an error");
            return Err(DictationError::Transport(message));
        }

        response.json::<ExtractionResponse>().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Extraction response could not be decoded");
            DictationError::Transport(format!("Respuesta inválida del servicio: {}", e))
        })
    }
}

/// Pull a human message out of an error body: `detail` first, then `error`.
fn error_message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "error"].iter().find_map(|key| match value.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}
