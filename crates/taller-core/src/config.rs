use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TallerError};

/// Top-level configuration for the dictation core.
///
/// Loaded from `~/.taller/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallerConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub dictation: DictationConfig,
}

impl TallerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TallerConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the dictation pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.base_url.trim().is_empty() {
            return Err(TallerError::Config(
                "extraction.base_url must not be empty".to_string(),
            ));
        }
        if self.dictation.max_duration_secs == 0 {
            return Err(TallerError::Config(
                "dictation.max_duration_secs must be greater than zero".to_string(),
            ));
        }
        if self
            .dictation
            .stop_phrases
            .iter()
            .all(|p| p.trim().is_empty())
        {
            return Err(TallerError::Config(
                "dictation.stop_phrases needs at least one phrase".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Remote extraction service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Base URL of the backend API, e.g. `http://localhost:8001/api`.
    pub base_url: String,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Overall request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/api".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Speech capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Recognition locale.
    pub locale: String,
    /// Keep listening across pauses instead of stopping after one phrase.
    pub continuous: bool,
    /// Deliver uncommitted (interim) transcript chunks.
    pub interim_results: bool,
    /// Alternatives requested per recognition result.
    pub max_alternatives: u32,
    /// Maximum capture duration in seconds before the recognizer is stopped.
    pub max_duration_secs: u64,
    /// Spoken phrases that end the recording.
    pub stop_phrases: Vec<String>,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            locale: "es-ES".to_string(),
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
            max_duration_secs: 120,
            stop_phrases: vec![
                "finalizar".to_string(),
                "terminar".to_string(),
                "procesar".to_string(),
            ],
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
