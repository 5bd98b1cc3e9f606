//! Error taxonomy for dictation sessions.
//!
//! Every variant's `Display` output is the message handed back to the
//! calling page in `{success: false, error}`.

use taller_core::error::TallerError;

/// Errors that end a dictation session without structured data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DictationError {
    /// No speech-recognition capability on this platform.
    #[error("Navegador no soportado")]
    UnsupportedPlatform,
    /// Only stop phrases (or whitespace) were captured.
    #[error("Texto vacío")]
    EmptyCapture,
    /// The session ended without any finalized transcript.
    #[error("Sin audio")]
    NoAudio,
    /// The recognition engine failed mid-session; carries the engine error code.
    #[error("{0}")]
    Recognition(String),
    /// The extraction service answered but produced no structured data.
    #[error("{0}")]
    ExtractionFailure(String),
    /// The extraction service could not be reached or returned an HTTP error.
    #[error("{0}")]
    Transport(String),
    /// A session is already recording or processing.
    #[error("Ya hay un dictado en curso")]
    Busy,
    /// The caller cancelled the session.
    #[error("Dictado cancelado")]
    Cancelled,
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),
    #[error("Configuración inválida: {0}")]
    Configuration(String),
    #[error("Error interno: {0}")]
    Internal(String),
}

impl DictationError {
    /// Stable snake_case name for logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            DictationError::UnsupportedPlatform => "unsupported_platform",
            DictationError::EmptyCapture => "empty_capture",
            DictationError::NoAudio => "no_audio",
            DictationError::Recognition(_) => "recognition_error",
            DictationError::ExtractionFailure(_) => "extraction_failure",
            DictationError::Transport(_) => "transport_error",
            DictationError::Busy => "busy",
            DictationError::Cancelled => "cancelled",
            DictationError::InvalidTransition(_) => "invalid_transition",
            DictationError::Configuration(_) => "configuration",
            DictationError::Internal(_) => "internal",
        }
    }
}

impl From<DictationError> for TallerError {
    fn from(err: DictationError) -> Self {
        match err {
            DictationError::ExtractionFailure(msg) | DictationError::Transport(msg) => {
                TallerError::Extraction(msg)
            }
            DictationError::Configuration(msg) => TallerError::Config(msg),
            other => TallerError::Dictation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_facing_messages() {
        assert_eq!(
            DictationError::UnsupportedPlatform.to_string(),
            "Navegador no soportado"
        );
        assert_eq!(DictationError::EmptyCapture.to_string(), "Texto vacío");
        assert_eq!(DictationError::NoAudio.to_string(), "Sin audio");
        assert_eq!(
            DictationError::Recognition("not-allowed".into()).to_string(),
            "not-allowed"
        );
        assert_eq!(
            DictationError::Transport("servicio no disponible".into()).to_string(),
            "servicio no disponible"
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(DictationError::NoAudio.kind(), "no_audio");
        assert_eq!(DictationError::Recognition("network".into()).kind(), "recognition_error");
        assert_eq!(DictationError::Cancelled.kind(), "cancelled");
    }

    #[test]
    fn test_conversion_to_taller_error() {
        let err: TallerError = DictationError::Transport("timeout".into()).into();
        assert!(matches!(err, TallerError::Extraction(ref m) if m == "timeout"));

        let err: TallerError = DictationError::NoAudio.into();
        assert_eq!(err.to_string(), "Dictation error: Sin audio");

        let err: TallerError = DictationError::Configuration("bad".into()).into();
        assert!(matches!(err, TallerError::Config(_)));
    }
}
