//! Dictation Dispatcher: cleaned text in, structured fields out.
//!
//! Selects the extraction contract for the form context, makes exactly one
//! remote call and folds every outcome into an [`ExtractionResult`]. Never
//! retries; the caller decides whether to ask for a new dictation.

use std::sync::Arc;

use serde_json::Value;

use taller_core::types::FormContext;

use crate::client::ExtractionClient;
use crate::contract::contract_for;
use crate::error::DictationError;
use crate::notify::{Notifier, TracingNotifier};
use crate::result::{Extraction, ExtractionResult};

#[derive(Clone)]
pub struct DictationDispatcher {
    client: Arc<dyn ExtractionClient>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for DictationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictationDispatcher").finish_non_exhaustive()
    }
}

impl DictationDispatcher {
    /// Create a dispatcher that reports to the tracing log.
    pub fn new(client: Arc<dyn ExtractionClient>) -> Self {
        Self::with_notifier(client, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(client: Arc<dyn ExtractionClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, notifier }
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    /// Send `cleaned_text` for extraction under `form_context`'s contract.
    pub async fn dispatch(&self, cleaned_text: &str, form_context: FormContext) -> ExtractionResult {
        self.dispatch_with_context(cleaned_text, form_context, None)
            .await
    }

    /// Like [`dispatch`](Self::dispatch), with free-form `contexto` for the
    /// extractor (e.g. the vehicle the order belongs to).
    pub async fn dispatch_with_context(
        &self,
        cleaned_text: &str,
        form_context: FormContext,
        contexto: Option<&str>,
    ) -> ExtractionResult {
        let contract = contract_for(form_context);
        let mut request = contract.request(cleaned_text);
        if let Some(contexto) = contexto.filter(|c| !c.trim().is_empty()) {
            request = request.with_context(contexto);
        }

        self.notifier.info("🤖 Procesando dictado con IA...");
        tracing::info!(
            form_context = %form_context,
            endpoint = contract.endpoint,
            text_len = cleaned_text.len(),
            "Dispatching dictation for extraction"
        );

        let response = match self.client.extract(contract.endpoint, &request).await {
            Ok(response) => response,
            Err(err) => {
                let err = match err {
                    DictationError::Transport(msg) => DictationError::Transport(msg),
                    other => DictationError::Transport(other.to_string()),
                };
                self.notifier
                    .error(&format!("❌ Error procesando el dictado: {}", err));
                return Err(err);
            }
        };

        match (response.success, response.datos) {
            (true, Some(Value::Object(data))) => {
                tracing::info!(fields = data.len(), "Extraction succeeded");
                self.notifier.success("✅ Información extraída correctamente");
                Ok(Extraction {
                    data,
                    original_text: cleaned_text.to_string(),
                })
            }
            _ => {
                let message = response
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "Error desconocido".to_string());
                tracing::warn!(error = %message, "Extraction service declined the dictation");
                self.notifier.error(&format!(
                    "❌ La IA no pudo procesar la información: {}",
                    message
                ));
                Err(DictationError::ExtractionFailure(message))
            }
        }
    }
}
