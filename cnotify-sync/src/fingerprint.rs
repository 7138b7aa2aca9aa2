//! Audience fingerprint derivation.
//!
//! The fingerprint is the tuple of language, platform, country and app
//! version that decides topic membership. It is derived once per cycle from
//! the host locale signal and the configured app version, and compared
//! structurally against the last persisted record to detect drift.

use serde::{Deserialize, Serialize};

/// Platform literal reported for this host environment.
pub const PLATFORM: &str = "web";

/// App version reported when the embedder does not configure one.
pub const DEFAULT_APP_VERSION: &str = "default";

/// Languages the audience service can segment on.
///
/// A closed set: anything outside it maps to [`Language::Unknown`], never to
/// a raw locale string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "id")]
    Indonesian,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Language {
    /// Maps a primary language subtag to a known language.
    /// Matching is case-insensitive; unrecognized subtags become `Unknown`.
    pub fn from_subtag(subtag: &str) -> Self {
        match subtag.to_lowercase().as_str() {
            "ar" => Self::Arabic,
            "zh" => Self::Chinese,
            "en" => Self::English,
            "fr" => Self::French,
            "de" => Self::German,
            "id" => Self::Indonesian,
            "it" => Self::Italian,
            "ja" => Self::Japanese,
            "ko" => Self::Korean,
            "pt" => Self::Portuguese,
            "ru" => Self::Russian,
            "es" => Self::Spanish,
            "tr" => Self::Turkish,
            _ => Self::Unknown,
        }
    }

    /// The two-letter code (or `"unknown"`) this language serializes as.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Arabic => "ar",
            Self::Chinese => "zh",
            Self::English => "en",
            Self::French => "fr",
            Self::German => "de",
            Self::Indonesian => "id",
            Self::Italian => "it",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Portuguese => "pt",
            Self::Russian => "ru",
            Self::Spanish => "es",
            Self::Turkish => "tr",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

/// The audience fingerprint. Immutable once constructed.
///
/// Serialized with the audience service's wire keys (`appVersion`), which
/// are also the persisted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceFingerprint {
    /// Device language, always a member of the known set.
    pub language: Language,
    /// Host platform literal.
    pub platform: String,
    /// Country segment. Derived from the primary language subtag, not a
    /// region subtag, for compatibility with existing subscriptions.
    pub country: String,
    /// Configured app version, or `"default"`.
    pub app_version: String,
}

/// Derives the canonical audience fingerprint from the host locale signal
/// and the configured app version. Both are captured at construction;
/// [`generate`](FingerprintGenerator::generate) itself is pure.
#[derive(Debug, Clone)]
pub struct FingerprintGenerator {
    locale: String,
    app_version: Option<String>,
}

impl FingerprintGenerator {
    /// Creates a generator for an explicit locale tag (e.g. `"en-US"`).
    pub fn new(locale: impl Into<String>, app_version: Option<String>) -> Self {
        Self {
            locale: locale.into(),
            app_version,
        }
    }

    /// Creates a generator from the process environment, reading the locale
    /// from `LC_ALL` then `LANG`. An unset environment yields `Unknown`.
    pub fn from_env(app_version: Option<String>) -> Self {
        let locale = std::env::var("LC_ALL")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_default();
        Self::new(locale, app_version)
    }

    /// Derives the fingerprint. No side effects.
    pub fn generate(&self) -> AudienceFingerprint {
        let subtag = self.primary_subtag();
        AudienceFingerprint {
            language: Language::from_subtag(&subtag),
            platform: PLATFORM.to_string(),
            country: if subtag.is_empty() {
                Language::Unknown.as_code().to_string()
            } else {
                subtag
            },
            app_version: self
                .app_version
                .clone()
                .unwrap_or_else(|| DEFAULT_APP_VERSION.to_string()),
        }
    }

    /// The lowercased primary subtag of the locale tag: everything before
    /// the first `-`, `_` or `.` separator. Handles both BCP-47 tags
    /// (`en-US`) and POSIX locales (`en_US.UTF-8`).
    fn primary_subtag(&self) -> String {
        self.locale
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }
}
