//! CLI argument definitions for the dictation runner.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use taller_core::types::{FieldKey, FormContext};

/// Taller dictado: turn a workshop dictation into structured form fields.
///
/// Reads a transcript (one recognized chunk per line, `~` marks an interim
/// chunk), runs it through the dictation pipeline and prints the outcome as
/// JSON.
#[derive(Parser, Debug)]
#[command(name = "taller-dictado", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the extraction service (e.g. http://localhost:8001/api).
    #[arg(short = 'u', long = "base-url")]
    pub base_url: Option<String>,

    /// Form being dictated: general, orden, vehiculo, mecanico or servicio.
    #[arg(short = 'x', long = "context", default_value = "general")]
    pub context: FormContext,

    /// Field that requested the dictation; omit for the whole form.
    #[arg(short = 'f', long = "field")]
    pub field: Option<String>,

    /// Extra context for the extractor, e.g. the vehicle being serviced.
    #[arg(short = 'n', long = "note")]
    pub note: Option<String>,

    /// Write the resolved configuration to the config path and exit.
    #[arg(long = "write-config")]
    pub write_config: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Transcript file; reads stdin when omitted or `-`.
    pub transcript: Option<PathBuf>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > TALLER_CONFIG env var > platform default (~/.taller/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("TALLER_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the extraction service base URL.
    ///
    /// Priority: --base-url flag > TALLER_API_URL env var > config file value.
    pub fn resolve_base_url(&self, config_url: &str) -> String {
        if let Some(ref url) = self.base_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("TALLER_API_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }
        config_url.to_string()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    pub fn field_key(&self) -> FieldKey {
        self.field
            .as_deref()
            .map(FieldKey::from)
            .unwrap_or_else(FieldKey::whole_form)
    }

    /// Extra context for the extractor, `None` when absent or blank.
    pub fn note(&self) -> Option<String> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }

    /// Transcript path, or `None` for stdin.
    pub fn transcript_path(&self) -> Option<&PathBuf> {
        self.transcript
            .as_ref()
            .filter(|p| p.as_os_str() != "-")
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".taller").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".taller").join("config.toml");
    }
    PathBuf::from("config.toml")
}
