//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::client::ExtractionClient;
use crate::contract::{ExtractionRequest, ExtractionResponse};
use crate::error::DictationError;

/// Returns a canned response and records every call.
pub(crate) struct RecordingClient {
    response: Result<ExtractionResponse, DictationError>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<(String, ExtractionRequest)>>,
}

impl RecordingClient {
    pub(crate) fn new(response: Result<ExtractionResponse, DictationError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            gate: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn ok(datos: Value) -> Arc<Self> {
        Self::new(Ok(ExtractionResponse {
            success: true,
            datos: Some(datos),
            error: None,
        }))
    }

    /// Like `ok`, but every call waits until `gate` is notified.
    pub(crate) fn gated(datos: Value, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(ExtractionResponse {
                success: true,
                datos: Some(datos),
                error: None,
            }),
            gate: Some(gate),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<(String, ExtractionRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionClient for RecordingClient {
    async fn extract(
        &self,
        endpoint: &str,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, DictationError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), request.clone()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.response.clone()
    }
}
