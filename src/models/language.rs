//! Language tags derived from vendor locale metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-letter language tags the downstream platform can train on.
const SUPPORTED_LANGUAGES: &[&str] = &[
    "ar", "de", "en", "es", "fr", "hi", "it", "ja", "ko", "nl", "pt", "zh",
];

/// A supported two-letter language tag (`en`, `fr`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Derive a language from a vendor locale string (`en-US`, `en_US`,
    /// `fr-CA`, or a bare `en`). Returns `None` when the locale does not
    /// map onto a supported language.
    pub fn from_locale(locale: &str) -> Option<Self> {
        let tag = locale.get(..2)?.to_lowercase();
        SUPPORTED_LANGUAGES
            .contains(&tag.as_str())
            .then_some(Language(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Record a locale signal: the first successfully derived language
    /// wins, later signals are ignored.
    pub fn merge_first(detected: &mut Option<Language>, locale: &str) {
        if detected.is_none() {
            *detected = Language::from_locale(locale);
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_locale_variants() {
        assert_eq!(Language::from_locale("en-US").unwrap().as_str(), "en");
        assert_eq!(Language::from_locale("en_GB").unwrap().as_str(), "en");
        assert_eq!(Language::from_locale("FR-ca").unwrap().as_str(), "fr");
        assert_eq!(Language::from_locale("pt").unwrap().as_str(), "pt");
    }

    #[test]
    fn test_from_locale_unsupported() {
        assert!(Language::from_locale("xx-XX").is_none());
        assert!(Language::from_locale("").is_none());
        assert!(Language::from_locale("e").is_none());
    }

    #[test]
    fn test_merge_first_wins() {
        let mut detected = None;
        Language::merge_first(&mut detected, "invalid");
        assert!(detected.is_none());
        Language::merge_first(&mut detected, "en-US");
        Language::merge_first(&mut detected, "fr-FR");
        assert_eq!(detected.unwrap().as_str(), "en");
    }
}
