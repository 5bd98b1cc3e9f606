//! Speech-recognition capability consumed by the capture controller.
//!
//! The recognizer is an external collaborator: it streams recognition events
//! until it is told to stop, then delivers a final `End`. Implementations
//! wrap a platform engine; `ScriptedRecognizer` replays a fixed transcript.

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use taller_core::config::DictationConfig;

use crate::error::DictationError;

/// Buffer size of the recognition event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Engine settings applied when a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerConfig {
    pub continuous: bool,
    pub interim_results: bool,
    pub locale: String,
    pub max_alternatives: u32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self::from(&DictationConfig::default())
    }
}

impl From<&DictationConfig> for RecognizerConfig {
    fn from(config: &DictationConfig) -> Self {
        Self {
            continuous: config.continuous,
            interim_results: config.interim_results,
            locale: config.locale.clone(),
            max_alternatives: config.max_alternatives,
        }
    }
}

/// One recognition result: the top alternative and whether it is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn final_text(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }

    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }
}

/// Events delivered by a running recognizer, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Partial recognition. Only `results[result_index..]` changed since the
    /// previous event.
    Result {
        result_index: usize,
        results: Vec<RecognitionResult>,
    },
    /// Engine fault, e.g. `not-allowed` or `network`. No `End` follows.
    Error { code: String },
    /// The engine stopped listening.
    End,
}

impl RecognitionEvent {
    /// Convenience constructor for an event carrying only new results.
    pub fn results(results: Vec<RecognitionResult>) -> Self {
        RecognitionEvent::Result {
            result_index: 0,
            results,
        }
    }
}

/// A continuous speech-recognition engine.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Whether the platform offers speech recognition at all.
    fn is_supported(&self) -> bool;

    /// Start listening. Events arrive on the returned channel until `End`
    /// or `Error`.
    async fn start(
        &self,
        config: &RecognizerConfig,
    ) -> Result<mpsc::Receiver<RecognitionEvent>, DictationError>;

    /// Ask the engine to stop; it answers with a final `End` event.
    async fn stop(&self);
}

/// Recognizer for platforms without speech recognition.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRecognizer;

#[async_trait]
impl SpeechRecognizer for UnsupportedRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    async fn start(
        &self,
        _config: &RecognizerConfig,
    ) -> Result<mpsc::Receiver<RecognitionEvent>, DictationError> {
        Err(DictationError::UnsupportedPlatform)
    }

    async fn stop(&self) {}
}

/// Replays a fixed list of recognition events.
///
/// Events are sent in order. If the script does not contain `End` or
/// `Error`, the recognizer keeps the session open until `stop()` is called,
/// like a live microphone would. After `stop()` the rest of the script is
/// dropped and `End` is delivered.
#[derive(Debug)]
pub struct ScriptedRecognizer {
    script: Vec<RecognitionEvent>,
    stop_signal: watch::Sender<bool>,
}

impl ScriptedRecognizer {
    pub fn new(script: Vec<RecognitionEvent>) -> Self {
        let (stop_signal, _) = watch::channel(false);
        Self {
            script,
            stop_signal,
        }
    }

    /// Build a script from transcript lines: lines starting with `~` are
    /// interim results, every other non-blank line is one final result.
    pub fn from_transcript(transcript: &str) -> Self {
        let script = transcript
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.strip_prefix('~') {
                Some(interim) => RecognitionResult::interim(interim.trim()),
                None => RecognitionResult::final_text(line),
            })
            .map(|result| RecognitionEvent::results(vec![result]))
            .collect();
        Self::new(script)
    }

    /// Whether `stop()` has been called since the last `start()`.
    pub fn stop_requested(&self) -> bool {
        *self.stop_signal.borrow()
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    fn is_supported(&self) -> bool {
        true
    }

    async fn start(
        &self,
        config: &RecognizerConfig,
    ) -> Result<mpsc::Receiver<RecognitionEvent>, DictationError> {
        tracing::debug!(
            locale = %config.locale,
            continuous = config.continuous,
            events = self.script.len(),
            "Scripted recognizer started"
        );

        self.stop_signal.send_replace(false);
        let mut stopped = self.stop_signal.subscribe();
        let script = self.script.clone();
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            for event in script {
                if *stopped.borrow() {
                    break;
                }
                let terminal = matches!(
                    event,
                    RecognitionEvent::End | RecognitionEvent::Error { .. }
                );
                if tx.send(event).await.is_err() || terminal {
                    return;
                }
                tokio::task::yield_now().await;
            }
            // Hold the session open until stopped, as a live engine would.
            let _ = stopped.wait_for(|stop| *stop).await;
            let _ = tx.send(RecognitionEvent::End).await;
        });

        Ok(rx)
    }

    async fn stop(&self) {
        self.stop_signal.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizer_config_from_dictation_config() {
        let config = RecognizerConfig::default();
        assert!(config.continuous);
        assert!(config.interim_results);
        assert_eq!(config.locale, "es-ES");
        assert_eq!(config.max_alternatives, 1);
    }

    #[test]
    fn test_from_transcript_parses_interim_lines() {
        let rec = ScriptedRecognizer::from_transcript("cambiar aceite\n~y fil\n\n  filtro finalizar  ");
        assert_eq!(rec.script.len(), 3);
        assert_eq!(
            rec.script[1],
            RecognitionEvent::results(vec![RecognitionResult::interim("y fil")])
        );
        assert_eq!(
            rec.script[2],
            RecognitionEvent::results(vec![RecognitionResult::final_text("filtro finalizar")])
        );
    }

    #[tokio::test]
    async fn test_scripted_recognizer_replays_until_end() {
        let rec = ScriptedRecognizer::new(vec![
            RecognitionEvent::results(vec![RecognitionResult::final_text("hola")]),
            RecognitionEvent::End,
            RecognitionEvent::results(vec![RecognitionResult::final_text("ignorado")]),
        ]);
        let mut rx = rec.start(&RecognizerConfig::default()).await.unwrap();

        assert!(matches!(rx.recv().await, Some(RecognitionEvent::Result { .. })));
        assert_eq!(rx.recv().await, Some(RecognitionEvent::End));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_scripted_recognizer_holds_open_until_stop() {
        let rec = ScriptedRecognizer::new(vec![RecognitionEvent::results(vec![
            RecognitionResult::final_text("revisar frenos"),
        ])]);
        let mut rx = rec.start(&RecognizerConfig::default()).await.unwrap();
        assert!(matches!(rx.recv().await, Some(RecognitionEvent::Result { .. })));
        assert!(!rec.stop_requested());

        rec.stop().await;
        assert!(rec.stop_requested());
        assert_eq!(rx.recv().await, Some(RecognitionEvent::End));
    }

    #[tokio::test]
    async fn test_unsupported_recognizer() {
        let rec = UnsupportedRecognizer;
        assert!(!rec.is_supported());
        let err = rec.start(&RecognizerConfig::default()).await.unwrap_err();
        assert_eq!(err, DictationError::UnsupportedPlatform);
    }
}
