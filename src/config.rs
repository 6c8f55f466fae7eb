use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};
use crate::honorifics::{default_honorifics, Honorific};

pub const DEFAULT_HIGH_CONFIDENCE_PRONOUNS: usize = 3;
pub const DEFAULT_MIN_TOKENS_FIRST_LAST: usize = 3;

/// Lemmas of reporting verbs: the subject of one is a source.
pub const DEFAULT_SPEECH_VERBS: &[&str] = &[
    "say", "tell", "add", "ask", "reply", "explain", "state", "note", "claim", "announce",
    "insist", "argue", "write",
];

/// Tables and thresholds injected into the engine.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub honorifics: Vec<Honorific>,
    /// Pronoun count at which unanimous coref evidence becomes HIGH confidence
    pub high_confidence_pronouns: usize,
    /// Minimum tokens in a name before "first + last" counts as a subset of it
    pub min_tokens_first_last: usize,
    /// Verbs (lower-case lemmas) whose subject counts as a speaker
    pub speech_verbs: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            honorifics: default_honorifics(),
            high_confidence_pronouns: DEFAULT_HIGH_CONFIDENCE_PRONOUNS,
            min_tokens_first_last: DEFAULT_MIN_TOKENS_FIRST_LAST,
            speech_verbs: DEFAULT_SPEECH_VERBS.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.high_confidence_pronouns == 0 {
            return Err(ResolveError::InvalidConfig(
                "high_confidence_pronouns must be at least 1".into(),
            ));
        }
        // "first last" is two tokens, so a one-token name cannot hold it
        if self.min_tokens_first_last < 2 {
            return Err(ResolveError::InvalidConfig(
                "min_tokens_first_last must be at least 2".into(),
            ));
        }
        if let Some(bad) = self.speech_verbs.iter().find(|v| v.trim().is_empty() || **v != v.to_lowercase()) {
            return Err(ResolveError::InvalidConfig(format!(
                "speech verb {bad:?} must be a non-empty lower-case lemma"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "high_confidence_pronouns": 5 }"#).unwrap();
        assert_eq!(config.high_confidence_pronouns, 5);
        assert_eq!(config.min_tokens_first_last, DEFAULT_MIN_TOKENS_FIRST_LAST);
        assert_eq!(config.honorifics, default_honorifics());
        assert!(config.speech_verbs.iter().any(|v| v == "say"));
    }

    #[test]
    fn test_custom_honorific_table() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "honorifics": [ { "title": "Frau", "gender": "FEMALE" }, { "title": "Dr" } ] }"#,
        )
        .unwrap();
        assert_eq!(config.honorifics.len(), 2);
        assert_eq!(config.honorifics[1].gender, None);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = EngineConfig {
            high_confidence_pronouns: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_first_last_needs_two_tokens() {
        for (min, ok) in [(1, false), (2, true), (3, true)] {
            let config = EngineConfig {
                min_tokens_first_last: min,
                ..EngineConfig::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "{min}");
        }
    }

    #[test]
    fn test_speech_verbs_must_be_lemmas() {
        let config: EngineConfig = serde_json::from_str(r#"{ "speech_verbs": ["Said"] }"#).unwrap();
        assert!(matches!(config.validate(), Err(ResolveError::InvalidConfig(_))));
    }
}
