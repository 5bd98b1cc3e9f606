//! Speech Capture Controller.
//!
//! Runs one dictation session end to end: acquire the microphone, stream
//! recognition events into a [`DictationSession`] until a stop phrase, the
//! end of speech or the maximum duration, clean the transcript and hand it
//! to the [`DictationDispatcher`]. At most one session per controller (and
//! per shared [`MicrophoneArbiter`]) is active at a time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use taller_core::config::DictationConfig;
use taller_core::events::DomainEvent;
use taller_core::types::{FieldKey, FormContext, SessionId, Timestamp};

use crate::arbiter::{MicrophoneArbiter, MicrophoneLease};
use crate::dispatcher::DictationDispatcher;
use crate::error::DictationError;
use crate::notify::Notifier;
use crate::phrases::StopPhrases;
use crate::recognizer::{RecognitionEvent, RecognizerConfig, SpeechRecognizer};
use crate::result::ExtractionResult;
use crate::session::DictationSession;
use crate::state::{DictationState, DictationStatus, StateMachine};

/// How long the recognizer may keep delivering events after being asked to stop.
const STOP_GRACE: Duration = Duration::from_secs(2);

/// The session currently holding the controller.
#[derive(Debug)]
struct ActiveSession {
    id: SessionId,
    cancel: CancellationToken,
}

pub struct SpeechCaptureController {
    recognizer: Arc<dyn SpeechRecognizer>,
    dispatcher: DictationDispatcher,
    notifier: Arc<dyn Notifier>,
    state: StateMachine,
    arbiter: MicrophoneArbiter,
    recognizer_config: RecognizerConfig,
    stop_phrases: StopPhrases,
    max_duration: Duration,
    active: Mutex<Option<ActiveSession>>,
    events: Option<broadcast::Sender<DomainEvent>>,
}

impl std::fmt::Debug for SpeechCaptureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechCaptureController")
            .field("state", &self.state)
            .field("stop_phrases", &self.stop_phrases.phrases())
            .field("max_duration", &self.max_duration)
            .finish_non_exhaustive()
    }
}

impl SpeechCaptureController {
    /// Create an idle controller with its own microphone arbiter.
    ///
    /// Notifications go to the dispatcher's notifier so the whole session
    /// reports through one sink.
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        dispatcher: DictationDispatcher,
        config: &DictationConfig,
    ) -> Result<Self, DictationError> {
        Ok(Self {
            recognizer,
            notifier: dispatcher.notifier(),
            dispatcher,
            state: StateMachine::new(),
            arbiter: MicrophoneArbiter::new(),
            recognizer_config: RecognizerConfig::from(config),
            stop_phrases: StopPhrases::new(&config.stop_phrases)?,
            max_duration: Duration::from_secs(config.max_duration_secs),
            active: Mutex::new(None),
            events: None,
        })
    }

    /// Share the microphone with other controllers.
    pub fn with_arbiter(mut self, arbiter: MicrophoneArbiter) -> Self {
        self.arbiter = arbiter;
        self
    }

    /// Publish [`DomainEvent`]s for every session on `events`.
    pub fn with_events(mut self, events: broadcast::Sender<DomainEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Subscribe to state changes (for activation controls).
    pub fn status(&self) -> watch::Receiver<DictationStatus> {
        self.state.subscribe()
    }

    pub fn current_status(&self) -> DictationStatus {
        self.state.snapshot()
    }

    pub fn is_recording(&self) -> bool {
        self.state.current() == DictationState::Listening
    }

    pub fn is_processing(&self) -> bool {
        self.state.current() == DictationState::Processing
    }

    pub fn stop_phrases(&self) -> &StopPhrases {
        &self.stop_phrases
    }

    /// Record one dictation for `field_key` and extract it under
    /// `form_context`'s contract.
    ///
    /// Fails with `Busy` without touching the running session if one is
    /// already active. Every other outcome returns the controller to Idle.
    pub async fn start_session(
        &self,
        form_context: FormContext,
        field_key: FieldKey,
    ) -> ExtractionResult {
        self.start_session_with_context(form_context, field_key, None)
            .await
    }

    /// Like [`start_session`](Self::start_session), forwarding `contexto`
    /// to the extraction service alongside the transcript.
    pub async fn start_session_with_context(
        &self,
        form_context: FormContext,
        field_key: FieldKey,
        contexto: Option<String>,
    ) -> ExtractionResult {
        if !self.recognizer.is_supported() {
            tracing::warn!("Speech recognition is not available on this platform");
            self.notifier
                .error("❌ Reconocimiento de voz no soportado en este navegador");
            return Err(DictationError::UnsupportedPlatform);
        }

        let mut session =
            DictationSession::new(form_context, field_key).with_context(contexto);
        let (lease, cancel) = self.begin(&session)?;

        tracing::info!(
            session_id = %session.id,
            form_context = %form_context,
            field = %session.field_key,
            "Dictation session started"
        );
        self.notifier.info(&format!(
            "🎤 Grabando {}... Di \"{}\" para procesar",
            form_context.label(),
            self.stop_phrases.primary()
        ));
        self.emit(DomainEvent::DictationStarted {
            session_id: session.id,
            form_context,
            field_key: session.field_key.clone(),
            timestamp: Timestamp::now(),
        });

        let result = self.run(&mut session, &cancel).await;
        self.finish(&session, &result);
        drop(lease);
        result
    }

    /// Abort the active session, whether it is recording or waiting on the
    /// extraction service. The session resolves with `Cancelled`.
    pub fn cancel_session(&self) -> Result<(), DictationError> {
        let guard = self
            .active
            .lock()
            .map_err(|e| DictationError::Internal(format!("Session mutex poisoned: {}", e)))?;
        match guard.as_ref() {
            Some(active) => {
                tracing::info!(session_id = %active.id, "Dictation cancel requested");
                active.cancel.cancel();
                Ok(())
            }
            None => Err(DictationError::InvalidTransition(format!(
                "Cannot cancel dictation from {} state",
                self.state.current()
            ))),
        }
    }

    /// Claim the microphone and the controller for `session`.
    fn begin(
        &self,
        session: &DictationSession,
    ) -> Result<(MicrophoneLease, CancellationToken), DictationError> {
        let mut guard = self
            .active
            .lock()
            .map_err(|e| DictationError::Internal(format!("Session mutex poisoned: {}", e)))?;

        let lease = self
            .arbiter
            .try_acquire()
            .inspect_err(|_| tracing::debug!("Dictation rejected: microphone already in use"))?;
        self.state.begin(session.field_key.clone())?;

        let cancel = CancellationToken::new();
        *guard = Some(ActiveSession {
            id: session.id,
            cancel: cancel.clone(),
        });
        Ok((lease, cancel))
    }

    async fn run(&self, session: &mut DictationSession, cancel: &CancellationToken) -> ExtractionResult {
        let mut events = match self.recognizer.start(&self.recognizer_config).await {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(error = %err, "Recognizer failed to start");
                self.notifier
                    .error(&format!("Error en el reconocimiento de voz: {}", err));
                return Err(err);
            }
        };

        self.capture(session, &mut events, cancel).await?;
        let text = self.captured_text(session)?;

        self.state.transition(DictationState::Processing)?;
        let duration_ms = session.elapsed_ms();
        tracing::info!(
            session_id = %session.id,
            text_len = text.len(),
            duration_ms,
            "Dictation captured"
        );
        self.emit(DomainEvent::DictationCaptured {
            session_id: session.id,
            text_length: text.len(),
            duration_ms,
            timestamp: Timestamp::now(),
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DictationError::Cancelled),
            result = self.dispatcher.dispatch_with_context(
                &text,
                session.form_context,
                session.contexto.as_deref(),
            ) => result,
        }
    }

    /// Consume recognition events until the recognizer ends.
    async fn capture(
        &self,
        session: &mut DictationSession,
        events: &mut mpsc::Receiver<RecognitionEvent>,
        cancel: &CancellationToken,
    ) -> Result<(), DictationError> {
        // A duration too large to represent means no deadline.
        let capture_deadline = Instant::now().checked_add(self.max_duration);
        let mut stop_requested = false;
        let mut stop_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.recognizer.stop().await;
                    return Err(DictationError::Cancelled);
                }
                _ = sleep_until_some(stop_deadline) => {
                    tracing::warn!(
                        session_id = %session.id,
                        "Recognizer kept running after stop; closing capture"
                    );
                    return Ok(());
                }
                _ = sleep_until_some(capture_deadline), if !stop_requested => {
                    tracing::warn!(
                        session_id = %session.id,
                        max_secs = self.max_duration.as_secs(),
                        "Maximum recording time reached"
                    );
                    self.notifier.warning("⏱️ Tiempo máximo de grabación alcanzado");
                    self.emit(DomainEvent::DictationMaxDuration {
                        session_id: session.id,
                        max_secs: self.max_duration.as_secs(),
                        timestamp: Timestamp::now(),
                    });
                    stop_requested = true;
                    stop_deadline = self.request_stop().await;
                }
                event = events.recv() => match event {
                    Some(RecognitionEvent::Result { result_index, results }) => {
                        session.apply(result_index, &results);
                        if !stop_requested && session.contains_stop_phrase(&self.stop_phrases) {
                            tracing::info!(session_id = %session.id, "Stop phrase detected");
                            self.emit(DomainEvent::StopPhraseDetected {
                                session_id: session.id,
                                timestamp: Timestamp::now(),
                            });
                            stop_requested = true;
                            stop_deadline = self.request_stop().await;
                        }
                    }
                    Some(RecognitionEvent::Error { code }) => {
                        tracing::warn!(session_id = %session.id, code = %code, "Speech recognition error");
                        self.notifier
                            .error(&format!("Error en el reconocimiento de voz: {}", code));
                        return Err(DictationError::Recognition(code));
                    }
                    Some(RecognitionEvent::End) | None => return Ok(()),
                },
            }
        }
    }

    /// Ask the recognizer to stop and return the grace deadline for its `End`.
    async fn request_stop(&self) -> Option<Instant> {
        self.recognizer.stop().await;
        Instant::now().checked_add(STOP_GRACE)
    }

    /// The cleaned transcript, or the reason there is nothing to dispatch.
    fn captured_text(&self, session: &DictationSession) -> Result<String, DictationError> {
        if !session.has_audio() {
            tracing::debug!(session_id = %session.id, "No final transcript captured");
            self.notifier.warning("No se capturó audio válido");
            return Err(DictationError::NoAudio);
        }

        let text = session.cleaned_text(&self.stop_phrases);
        if text.is_empty() {
            tracing::debug!(session_id = %session.id, "Transcript held only stop phrases");
            self.notifier.warning("No se detectó información para procesar");
            return Err(DictationError::EmptyCapture);
        }
        Ok(text)
    }

    /// Release the controller and report how the session ended.
    fn finish(&self, session: &DictationSession, result: &ExtractionResult) {
        match self.active.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        if self.state.transition(DictationState::Idle).is_err() {
            self.state.reset();
        }

        let timestamp = Timestamp::now();
        match result {
            Ok(extraction) => {
                tracing::info!(
                    session_id = %session.id,
                    fields = extraction.data.len(),
                    "Dictation session completed"
                );
                self.emit(DomainEvent::DictationCompleted {
                    session_id: session.id,
                    form_context: session.form_context,
                    field_count: extraction.data.len(),
                    timestamp,
                });
            }
            Err(DictationError::Cancelled) => {
                tracing::info!(session_id = %session.id, "Dictation session cancelled");
                self.notifier.warning("Dictado cancelado");
                self.emit(DomainEvent::DictationCancelled {
                    session_id: session.id,
                    timestamp,
                });
            }
            Err(err) => {
                tracing::info!(
                    session_id = %session.id,
                    kind = err.kind(),
                    error = %err,
                    "Dictation session failed"
                );
                self.emit(DomainEvent::DictationFailed {
                    session_id: session.id,
                    reason: err.to_string(),
                    timestamp,
                });
            }
        }
    }

    fn emit(&self, event: DomainEvent) {
        if let Some(events) = &self.events {
            // No subscribers is fine.
            let _ = events.send(event);
        }
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// =============================================================================
// Tests
// =============================================================================
