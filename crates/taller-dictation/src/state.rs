//! Dictation state machine with validated transitions.
//!
//! Enforces valid state transitions for the dictation lifecycle:
//! - Idle -> Listening (user triggers dictation)
//! - Listening -> Processing (capture ended with text to extract)
//! - Listening -> Idle (no audio, empty text, engine error, cancel)
//! - Processing -> Idle (extraction finished, failed or cancelled)
//!
//! The current state is published on a `tokio::sync::watch` channel so UIs
//! can project it onto their activation controls.

use std::fmt;

use tokio::sync::watch;

use taller_core::types::FieldKey;

use crate::error::DictationError;

/// Operational state of a dictation controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DictationState {
    /// No dictation in progress. Ready to start.
    #[default]
    Idle,
    /// The recognizer is listening and streaming transcript fragments.
    Listening,
    /// The captured text is being sent to the extraction service.
    Processing,
}

impl fmt::Display for DictationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictationState::Idle => write!(f, "Idle"),
            DictationState::Listening => write!(f, "Listening"),
            DictationState::Processing => write!(f, "Processing"),
        }
    }
}

impl DictationState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &DictationState) -> bool {
        matches!(
            (self, target),
            (DictationState::Idle, DictationState::Listening)
                | (DictationState::Listening, DictationState::Processing)
                | (DictationState::Listening, DictationState::Idle)
                | (DictationState::Processing, DictationState::Idle)
        )
    }
}

/// Snapshot of a controller's state, as seen by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictationStatus {
    pub state: DictationState,
    /// Field that requested the current recording. Cleared once listening ends.
    pub active_field: Option<FieldKey>,
}

impl DictationStatus {
    pub fn is_recording(&self) -> bool {
        self.state == DictationState::Listening
    }

    pub fn is_processing(&self) -> bool {
        self.state == DictationState::Processing
    }

    /// True while a new session would be rejected.
    pub fn is_busy(&self) -> bool {
        self.state != DictationState::Idle
    }
}

/// State machine for dictation transitions.
///
/// All transitions are validated before being applied. Every accepted
/// transition is broadcast to `subscribe()` receivers.
#[derive(Debug)]
pub struct StateMachine {
    status: watch::Sender<DictationStatus>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        let (status, _) = watch::channel(DictationStatus::default());
        Self { status }
    }

    /// Returns the current state.
    pub fn current(&self) -> DictationState {
        self.status.borrow().state
    }

    /// Returns a copy of the current status.
    pub fn snapshot(&self) -> DictationStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<DictationStatus> {
        self.status.subscribe()
    }

    /// Enter `Listening` for `field`. Fails with `Busy` unless currently idle.
    pub fn begin(&self, field: FieldKey) -> Result<(), DictationError> {
        let mut accepted = false;
        self.status.send_if_modified(|status| {
            if status.state != DictationState::Idle {
                return false;
            }
            tracing::debug!("Dictation state: {} -> {}", status.state, DictationState::Listening);
            status.state = DictationState::Listening;
            status.active_field = Some(field);
            accepted = true;
            true
        });
        if accepted {
            Ok(())
        } else {
            Err(DictationError::Busy)
        }
    }

    /// Attempt to transition to the target state.
    ///
    /// Leaving `Listening` clears the active field.
    pub fn transition(&self, target: DictationState) -> Result<(), DictationError> {
        let mut outcome = Ok(());
        self.status.send_if_modified(|status| {
            if !status.state.can_transition_to(&target) {
                outcome = Err(DictationError::InvalidTransition(format!(
                    "{} -> {}",
                    status.state, target
                )));
                return false;
            }
            tracing::debug!("Dictation state: {} -> {}", status.state, target);
            status.state = target;
            if target != DictationState::Listening {
                status.active_field = None;
            }
            true
        });
        outcome
    }

    /// Force the state machine back to Idle (used for error recovery).
    pub fn reset(&self) {
        self.status.send_modify(|status| {
            tracing::warn!("Dictation state machine reset to Idle from {}", status.state);
            *status = DictationStatus::default();
        });
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use DictationState::*;
        let allowed = [(Idle, Listening), (Listening, Processing), (Listening, Idle), (Processing, Idle)];
        for from in [Idle, Listening, Processing] {
            for to in [Idle, Listening, Processing] {
                assert_eq!(
                    from.can_transition_to(&to),
                    allowed.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_happy_path_tracks_active_field() {
        let sm = StateMachine::new();
        assert_eq!(sm.current(), DictationState::Idle);

        sm.begin(FieldKey::from("diagnostico")).unwrap();
        let status = sm.snapshot();
        assert!(status.is_recording());
        assert_eq!(status.active_field, Some(FieldKey::from("diagnostico")));

        sm.transition(DictationState::Processing).unwrap();
        let status = sm.snapshot();
        assert!(status.is_processing());
        assert_eq!(status.active_field, None);

        sm.transition(DictationState::Idle).unwrap();
        assert!(!sm.snapshot().is_busy());
    }

    #[test]
    fn test_begin_while_busy_is_rejected() {
        let sm = StateMachine::new();
        sm.begin(FieldKey::from("nombre")).unwrap();
        assert_eq!(sm.begin(FieldKey::from("telefono")), Err(DictationError::Busy));
        assert_eq!(
            sm.snapshot().active_field,
            Some(FieldKey::from("nombre"))
        );

        sm.transition(DictationState::Processing).unwrap();
        assert_eq!(sm.begin(FieldKey::whole_form()), Err(DictationError::Busy));
    }

    #[test]
    fn test_processing_requires_capture() {
        let sm = StateMachine::new();
        assert_eq!(
            sm.transition(DictationState::Processing),
            Err(DictationError::InvalidTransition("Idle -> Processing".into()))
        );
        assert_eq!(sm.snapshot(), DictationStatus::default());
    }

    #[test]
    fn test_reset_clears_active_field() {
        let sm = StateMachine::new();
        sm.begin(FieldKey::from("precio")).unwrap();
        sm.reset();
        assert_eq!(sm.snapshot(), DictationStatus::default());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let sm = StateMachine::new();
        let mut rx = sm.subscribe();

        sm.begin(FieldKey::from("observaciones")).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_recording());

        sm.transition(DictationState::Idle).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().state, DictationState::Idle);
    }
}
