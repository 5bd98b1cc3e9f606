//! Projection of controller state onto a "Dictar" activation control.
//!
//! Several controls on one page may share a controller. All of them are
//! disabled while it is busy, but only the control whose field requested the
//! recording shows the listening state.

use taller_core::types::FieldKey;

use crate::state::{DictationState, DictationStatus};

const DEFAULT_LABEL: &str = "Dictar";
const LISTENING_LABEL: &str = "Escuchando...";

/// Visual state shared by every activation control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Recording,
    Processing,
}

impl From<DictationState> for ControlState {
    fn from(state: DictationState) -> Self {
        match state {
            DictationState::Idle => ControlState::Idle,
            DictationState::Listening => ControlState::Recording,
            DictationState::Processing => ControlState::Processing,
        }
    }
}

/// What one control should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub state: ControlState,
    pub disabled: bool,
    /// This control's field is the one being recorded.
    pub listening: bool,
    pub label: String,
}

/// A dictation trigger bound to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationControl {
    pub field: FieldKey,
    pub label: String,
}

impl ActivationControl {
    pub fn new(field: FieldKey) -> Self {
        Self {
            field,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn project(&self, status: &DictationStatus) -> ControlView {
        let listening =
            status.is_recording() && status.active_field.as_ref() == Some(&self.field);
        ControlView {
            state: status.state.into(),
            disabled: status.is_busy(),
            listening,
            label: if listening {
                LISTENING_LABEL.to_string()
            } else {
                self.label.clone()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: DictationState, field: Option<&str>) -> DictationStatus {
        DictationStatus {
            state,
            active_field: field.map(FieldKey::from),
        }
    }

    #[test]
    fn test_idle_control_is_enabled() {
        let control = ActivationControl::new(FieldKey::from("diagnostico"));
        let view = control.project(&DictationStatus::default());
        assert_eq!(view.state, ControlState::Idle);
        assert!(!view.disabled);
        assert!(!view.listening);
        assert_eq!(view.label, "Dictar");
    }

    #[test]
    fn test_only_active_field_shows_listening() {
        let diagnosis = ActivationControl::new(FieldKey::from("diagnostico"));
        let notes = ActivationControl::new(FieldKey::from("observaciones")).with_label("Dictar notas");
        let recording = status(DictationState::Listening, Some("diagnostico"));

        let active = diagnosis.project(&recording);
        assert!(active.listening);
        assert!(active.disabled);
        assert_eq!(active.label, "Escuchando...");
        assert_eq!(active.state, ControlState::Recording);

        let sibling = notes.project(&recording);
        assert!(!sibling.listening);
        assert!(sibling.disabled);
        assert_eq!(sibling.label, "Dictar notas");
    }

    #[test]
    fn test_processing_disables_without_listening() {
        let control = ActivationControl::new(FieldKey::from("diagnostico"));
        let view = control.project(&status(DictationState::Processing, None));
        assert_eq!(view.state, ControlState::Processing);
        assert!(view.disabled);
        assert!(!view.listening);
        assert_eq!(view.label, "Dictar");
    }

    #[test]
    fn test_whole_form_control() {
        let control = ActivationControl::new(FieldKey::whole_form());
        let view = control.project(&status(DictationState::Listening, Some("")));
        assert!(view.listening);
    }
}
