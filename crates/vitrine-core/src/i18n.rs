//! Localized UI strings
//!
//! One TOML table per language is compiled into the binary. Lookups fall
//! back to English and then to the key itself, so a missing entry never
//! breaks the UI.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    EnUs,
    TrTr,
    DeDe,
    FrFr,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::EnUs,
        Language::TrTr,
        Language::DeDe,
        Language::FrFr,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::EnUs => "en-US",
            Language::TrTr => "tr-TR",
            Language::DeDe => "de-DE",
            Language::FrFr => "fr-FR",
        }
    }

    /// Name shown in the language picker
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::EnUs => "English",
            Language::TrTr => "Türkçe",
            Language::DeDe => "Deutsch",
            Language::FrFr => "Français",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code().eq_ignore_ascii_case(code))
    }

    /// Map a POSIX locale string (`de_DE.UTF-8`, `tr`, ...) to a language
    pub fn from_locale(locale: &str) -> Self {
        let locale = locale.to_ascii_lowercase();
        if locale.starts_with("tr") {
            Language::TrTr
        } else if locale.starts_with("de") {
            Language::DeDe
        } else if locale.starts_with("fr") {
            Language::FrFr
        } else {
            Language::EnUs
        }
    }

    /// Detect the language from `LC_ALL`, `LC_MESSAGES` or `LANG`
    pub fn from_environment() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .map(|v| Self::from_locale(&v))
            .unwrap_or_default()
    }

    fn table_source(&self) -> &'static str {
        match self {
            Language::EnUs => include_str!("../lang/en-US.toml"),
            Language::TrTr => include_str!("../lang/tr-TR.toml"),
            Language::DeDe => include_str!("../lang/de-DE.toml"),
            Language::FrFr => include_str!("../lang/fr-FR.toml"),
        }
    }

    fn load_table(&self) -> HashMap<String, String> {
        toml::from_str(self.table_source()).unwrap_or_else(|e| {
            warn!(language = self.code(), "String table failed to parse: {}", e);
            HashMap::new()
        })
    }
}

/// Active string table plus the English fallback
#[derive(Debug, Clone)]
pub struct Localizer {
    language: Language,
    active: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::for_language(Language::default())
    }
}

impl Localizer {
    /// Unknown codes fall back to English
    pub fn new(code: &str) -> Self {
        Self::for_language(Language::from_code(code).unwrap_or_default())
    }

    pub fn for_language(language: Language) -> Self {
        let fallback = Language::default().load_table();
        let active = if language == Language::default() {
            fallback.clone()
        } else {
            language.load_table()
        };
        Self {
            language,
            active,
            fallback,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        if language != self.language {
            *self = Self::for_language(language);
        }
    }

    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.active
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }
}
