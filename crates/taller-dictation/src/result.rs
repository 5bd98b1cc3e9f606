//! The value handed back to the calling page.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DictationError;

/// Structured fields extracted from a dictation.
///
/// Ownership passes to the caller, which merges `data` into its own form.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub data: Map<String, Value>,
    /// The cleaned text exactly as it was sent for extraction.
    pub original_text: String,
}

/// Outcome of one dictation session or one dispatch.
pub type ExtractionResult = Result<Extraction, DictationError>;

/// Flat wire form of an [`ExtractionResult`]:
/// `{success: true, data, originalText}` or `{success: false, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ExtractionResult> for ExtractionOutcome {
    fn from(result: &ExtractionResult) -> Self {
        match result {
            Ok(extraction) => Self {
                success: true,
                data: Some(extraction.data.clone()),
                original_text: Some(extraction.original_text.clone()),
                error: None,
            },
            Err(err) => Self {
                success: false,
                data: None,
                original_text: None,
                error: Some(err.to_string()),
            },
        }
    }
}

impl From<ExtractionResult> for ExtractionOutcome {
    fn from(result: ExtractionResult) -> Self {
        match result {
            Ok(extraction) => Self {
                success: true,
                data: Some(extraction.data),
                original_text: Some(extraction.original_text),
                error: None,
            },
            Err(err) => Self::from(&Err(err)),
        }
    }
}
