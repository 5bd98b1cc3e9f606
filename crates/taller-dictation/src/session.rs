//! Transcript accumulation for one recording.

use chrono::{DateTime, Utc};

use taller_core::types::{FieldKey, FormContext, SessionId};

use crate::phrases::StopPhrases;
use crate::recognizer::RecognitionResult;

/// Data for one user-initiated recording. Never persisted.
#[derive(Debug, Clone)]
pub struct DictationSession {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
    pub form_context: FormContext,
    /// Field that requested the recording; empty for whole-form dictation.
    pub field_key: FieldKey,
    /// Committed transcript, each chunk followed by a space.
    pub finalized_text: String,
    /// Latest uncommitted transcript, replaced on every event.
    pub pending_text: String,
    /// Free-form hint forwarded to the extractor with the transcript.
    pub contexto: Option<String>,
}

impl DictationSession {
    pub fn new(form_context: FormContext, field_key: FieldKey) -> Self {
        Self {
            id: SessionId::new(),
            started_at: Utc::now(),
            form_context,
            field_key,
            finalized_text: String::new(),
            pending_text: String::new(),
            contexto: None,
        }
    }

    pub fn with_context(mut self, contexto: Option<String>) -> Self {
        self.contexto = contexto;
        self
    }

    /// Fold one recognition event into the transcript.
    pub fn apply(&mut self, result_index: usize, results: &[RecognitionResult]) {
        self.pending_text.clear();
        for result in results.iter().skip(result_index) {
            if result.is_final {
                self.finalized_text.push_str(&result.transcript);
                self.finalized_text.push(' ');
            } else {
                self.pending_text.push_str(&result.transcript);
            }
        }
    }

    /// Committed plus pending text, as scanned for stop phrases.
    pub fn combined_text(&self) -> String {
        format!("{}{}", self.finalized_text, self.pending_text).to_lowercase()
    }

    /// Whether the transcript so far, interim text included, holds a stop phrase.
    pub fn contains_stop_phrase(&self, phrases: &StopPhrases) -> bool {
        phrases.is_match(&self.combined_text())
    }

    /// Whether any committed speech was captured.
    pub fn has_audio(&self) -> bool {
        !self.finalized_text.trim().is_empty()
    }

    /// Committed text with stop phrases removed.
    pub fn cleaned_text(&self, phrases: &StopPhrases) -> String {
        phrases.strip(&self.finalized_text)
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DictationSession {
        DictationSession::new(FormContext::Order, FieldKey::from("diagnostico"))
    }

    #[test]
    fn test_new_session_is_empty() {
        let s = session();
        assert!(s.finalized_text.is_empty());
        assert!(s.pending_text.is_empty());
        assert!(!s.has_audio());
        assert_eq!(s.form_context, FormContext::Order);
        assert!(s.elapsed_ms() < 1000);
    }

    #[test]
    fn test_final_chunks_accumulate_with_trailing_space() {
        let mut s = session();
        s.apply(0, &[RecognitionResult::final_text("cambiar aceite")]);
        s.apply(0, &[RecognitionResult::final_text("y filtro")]);
        assert_eq!(s.finalized_text, "cambiar aceite y filtro ");
        assert!(s.has_audio());
    }

    #[test]
    fn test_interim_text_is_replaced_each_event() {
        let mut s = session();
        s.apply(0, &[RecognitionResult::interim("cam")]);
        assert_eq!(s.pending_text, "cam");
        s.apply(0, &[RecognitionResult::interim("cambiar")]);
        assert_eq!(s.pending_text, "cambiar");
        s.apply(0, &[RecognitionResult::final_text("cambiar aceite")]);
        assert_eq!(s.pending_text, "");
        assert_eq!(s.finalized_text, "cambiar aceite ");
    }

    #[test]
    fn test_results_before_index_are_skipped() {
        let mut s = session();
        s.apply(
            1,
            &[
                RecognitionResult::final_text("ya contado"),
                RecognitionResult::final_text("nuevo"),
                RecognitionResult::interim("pendi"),
            ],
        );
        assert_eq!(s.finalized_text, "nuevo ");
        assert_eq!(s.pending_text, "pendi");
    }

    #[test]
    fn test_combined_text_is_lowercase() {
        let mut s = session();
        s.apply(
            0,
            &[
                RecognitionResult::final_text("Revisar"),
                RecognitionResult::interim("FINALIZAR"),
            ],
        );
        assert_eq!(s.combined_text(), "revisar finalizar");
        assert!(StopPhrases::default().is_match(&s.combined_text()));
    }

    #[test]
    fn test_cleaned_text_ignores_pending() {
        let mut s = session();
        s.apply(
            0,
            &[
                RecognitionResult::final_text("cambiar aceite y filtro finalizar"),
                RecognitionResult::interim("algo más"),
            ],
        );
        assert_eq!(s.cleaned_text(&StopPhrases::default()), "cambiar aceite y filtro");
    }

    #[test]
    fn test_stop_phrase_in_interim_text() {
        let phrases = StopPhrases::default();
        let mut s = session();
        s.apply(0, &[RecognitionResult::final_text("revisar frenos")]);
        assert!(!s.contains_stop_phrase(&phrases));
        s.apply(0, &[RecognitionResult::interim("Terminar")]);
        assert!(s.contains_stop_phrase(&phrases));
    }

    #[test]
    fn test_whitespace_only_is_not_audio() {
        let mut s = session();
        s.apply(0, &[RecognitionResult::final_text("   ")]);
        assert!(!s.has_audio());
    }
}
