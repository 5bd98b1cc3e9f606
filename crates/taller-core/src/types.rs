use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TallerError;

// =============================================================================
// Enums
// =============================================================================

/// The logical form a dictation is filling in.
///
/// Determines which extraction contract is used and how extracted fields are
/// merged back into the form. Serialized with the tags the extraction
/// service expects in `tipo_formulario`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormContext {
    /// Free-form dictation with no specific form.
    #[default]
    #[serde(rename = "general")]
    General,
    /// Work order (diagnosis, faults, repairs, parts, observations).
    #[serde(rename = "orden")]
    Order,
    /// Vehicle intake, including the owning client.
    #[serde(rename = "vehiculo")]
    Vehicle,
    /// Mechanic roster entry.
    #[serde(rename = "mecanico")]
    Mechanic,
    /// Services and parts catalog entry.
    #[serde(rename = "servicio")]
    Service,
}

impl FormContext {
    pub const ALL: [FormContext; 5] = [
        FormContext::General,
        FormContext::Order,
        FormContext::Vehicle,
        FormContext::Mechanic,
        FormContext::Service,
    ];

    /// Tag sent to the extraction service as `tipo_formulario`.
    pub fn tag(&self) -> &'static str {
        match self {
            FormContext::General => "general",
            FormContext::Order => "orden",
            FormContext::Vehicle => "vehiculo",
            FormContext::Mechanic => "mecanico",
            FormContext::Service => "servicio",
        }
    }

    /// Human label shown in the "recording" notification.
    pub fn label(&self) -> &'static str {
        match self {
            FormContext::General => "información",
            FormContext::Order => "orden de trabajo",
            FormContext::Vehicle => "vehículo",
            FormContext::Mechanic => "mecánico",
            FormContext::Service => "servicio/repuesto",
        }
    }
}

impl fmt::Display for FormContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FormContext {
    type Err = TallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(FormContext::General),
            "orden" | "order" => Ok(FormContext::Order),
            "vehiculo" | "vehículo" | "vehicle" => Ok(FormContext::Vehicle),
            "mecanico" | "mecánico" | "mechanic" => Ok(FormContext::Mechanic),
            "servicio" | "service" => Ok(FormContext::Service),
            other => Err(TallerError::Config(format!("Unknown form context: {}", other))),
        }
    }
}

/// Severity of a user-facing notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

// =============================================================================
// Newtype Wrappers - Identity
// =============================================================================

/// Identifies the UI field that requested a dictation.
///
/// Empty means the whole form is being dictated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldKey(pub String);

impl FieldKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key used for whole-form dictation.
    pub fn whole_form() -> Self {
        Self(String::new())
    }

    pub fn is_whole_form(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a dictation session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Newtype Wrappers - Temporal
// =============================================================================

/// Unix timestamp in milliseconds since epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
