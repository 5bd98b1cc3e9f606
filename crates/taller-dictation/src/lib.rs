//! Taller Dictation crate - voice dictation for the workshop forms.
//!
//! A [`SpeechCaptureController`] records one dictation through a
//! [`SpeechRecognizer`], stops on a spoken stop phrase, and hands the cleaned
//! transcript to the [`DictationDispatcher`], which calls the extraction
//! service under the contract of the active form context. Controller state
//! moves Idle -> Listening -> Processing -> Idle and is observable through a
//! `watch` channel so activation controls can follow it.

pub mod arbiter;
pub mod capture;
pub mod client;
pub mod contract;
pub mod control;
pub mod dispatcher;
pub mod error;
pub mod merge;
pub mod notify;
pub mod phrases;
pub mod recognizer;
pub mod result;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use arbiter::{MicrophoneArbiter, MicrophoneLease};
pub use capture::SpeechCaptureController;
pub use client::{ExtractionClient, HttpExtractionClient};
pub use contract::{contract_for, ExtractionContract, ExtractionRequest, ExtractionResponse};
pub use control::{ActivationControl, ControlState, ControlView};
pub use dispatcher::DictationDispatcher;
pub use error::DictationError;
pub use merge::{merge_fields, MergePolicy};
pub use notify::{ChannelNotifier, Notification, Notifier, TracingNotifier};
pub use phrases::StopPhrases;
pub use recognizer::{
    RecognitionEvent, RecognitionResult, RecognizerConfig, ScriptedRecognizer, SpeechRecognizer,
    UnsupportedRecognizer,
};
pub use result::{Extraction, ExtractionOutcome, ExtractionResult};
pub use session::DictationSession;
pub use state::{DictationState, DictationStatus, StateMachine};
