use serde::{Deserialize, Serialize};

use crate::types::{FieldKey, FormContext, SessionId, Timestamp};

/// Domain events emitted over the course of a dictation session.
///
/// Published on a broadcast channel so UIs and audit logs can follow the
/// session without polling the controller.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DomainEvent {
    /// The recognizer started listening.
    DictationStarted {
        session_id: SessionId,
        form_context: FormContext,
        field_key: FieldKey,
        timestamp: Timestamp,
    },

    /// A stop phrase was heard and the recognizer was asked to stop.
    StopPhraseDetected {
        session_id: SessionId,
        timestamp: Timestamp,
    },

    /// The capture phase ended with text ready for extraction.
    DictationCaptured {
        session_id: SessionId,
        text_length: usize,
        duration_ms: i64,
        timestamp: Timestamp,
    },

    /// The extraction service returned structured fields.
    DictationCompleted {
        session_id: SessionId,
        form_context: FormContext,
        field_count: usize,
        timestamp: Timestamp,
    },

    /// The session ended without structured data.
    DictationFailed {
        session_id: SessionId,
        reason: String,
        timestamp: Timestamp,
    },

    /// The session was cancelled by the caller.
    DictationCancelled {
        session_id: SessionId,
        timestamp: Timestamp,
    },

    /// The capture reached its maximum duration.
    DictationMaxDuration {
        session_id: SessionId,
        max_secs: u64,
        timestamp: Timestamp,
    },
}

impl DomainEvent {
    /// Returns the session the event belongs to.
    pub fn session_id(&self) -> SessionId {
        match self {
            DomainEvent::DictationStarted { session_id, .. }
            | DomainEvent::StopPhraseDetected { session_id, .. }
            | DomainEvent::DictationCaptured { session_id, .. }
            | DomainEvent::DictationCompleted { session_id, .. }
            | DomainEvent::DictationFailed { session_id, .. }
            | DomainEvent::DictationCancelled { session_id, .. }
            | DomainEvent::DictationMaxDuration { session_id, .. } => *session_id,
        }
    }

    /// Returns the timestamp of the event.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            DomainEvent::DictationStarted { timestamp, .. }
            | DomainEvent::StopPhraseDetected { timestamp, .. }
            | DomainEvent::DictationCaptured { timestamp, .. }
            | DomainEvent::DictationCompleted { timestamp, .. }
            | DomainEvent::DictationFailed { timestamp, .. }
            | DomainEvent::DictationCancelled { timestamp, .. }
            | DomainEvent::DictationMaxDuration { timestamp, .. } => *timestamp,
        }
    }

    /// Returns a snake_case event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            DomainEvent::DictationStarted { .. } => "dictation_started",
            DomainEvent::StopPhraseDetected { .. } => "stop_phrase_detected",
            DomainEvent::DictationCaptured { .. } => "dictation_captured",
            DomainEvent::DictationCompleted { .. } => "dictation_completed",
            DomainEvent::DictationFailed { .. } => "dictation_failed",
            DomainEvent::DictationCancelled { .. } => "dictation_cancelled",
            DomainEvent::DictationMaxDuration { .. } => "dictation_max_duration",
        }
    }

    /// Whether the event ends its session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DomainEvent::DictationCompleted { .. }
                | DomainEvent::DictationFailed { .. }
                | DomainEvent::DictationCancelled { .. }
        )
    }
}
