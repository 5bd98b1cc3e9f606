//! Voice stop-phrase detection and stripping.

use regex::Regex;

use crate::error::DictationError;

/// Compiled set of spoken phrases that end a recording.
///
/// Matching is case-insensitive and substring-based, so "Finalizar." and
/// "finalizaremos" both trigger.
#[derive(Debug, Clone)]
pub struct StopPhrases {
    phrases: Vec<String>,
    pattern: Regex,
}

impl StopPhrases {
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Result<Self, DictationError> {
        let phrases: Vec<String> = phrases
            .iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        if phrases.is_empty() {
            return Err(DictationError::Configuration(
                "at least one stop phrase is required".to_string(),
            ));
        }
        let alternation = phrases
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("(?i)(?:{})", alternation))
            .map_err(|e| DictationError::Configuration(e.to_string()))?;
        Ok(Self { phrases, pattern })
    }

    /// The phrase announced to the user when recording starts.
    pub fn primary(&self) -> &str {
        &self.phrases[0]
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Whether `text` contains any stop phrase.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Remove every stop phrase occurrence and trim the result.
    ///
    /// Repeats until nothing matches, since removing one phrase can join its
    /// neighbours into another ("finaterminarlizar").
    pub fn strip(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        while self.pattern.is_match(&cleaned) {
            cleaned = self.pattern.replace_all(&cleaned, "").into_owned();
        }
        cleaned.trim().to_string()
    }
}

impl Default for StopPhrases {
    fn default() -> Self {
        Self::new(&["finalizar", "terminar", "procesar"])
            .expect("built-in stop phrases compile")
    }
}
