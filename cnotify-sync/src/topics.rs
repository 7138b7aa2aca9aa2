//! Audience topic-name derivation.
//!
//! Maps a fingerprint to the concrete topic names the audience service
//! manages on our behalf. The service performs the actual membership
//! changes; these names are logged during a drift cycle and persisted
//! through the legacy topic list record.

use crate::fingerprint::AudienceFingerprint;

const BASE_TOPIC: &str = "cnotify_";
const ALL_USERS_AUDIENCE: &str = "-all_users";
const AUDIENCE_SEPARATOR: &str = "_aud";

/// Derives audience topic names from a fingerprint.
#[derive(Debug, Clone, Default)]
pub struct TopicGenerator;

impl TopicGenerator {
    /// Creates a generator.
    pub fn new() -> Self {
        Self
    }

    /// Returns the topic names for a fingerprint, in the order the service
    /// expects them: OS, all-users, country, version.
    pub fn topics(&self, fingerprint: &AudienceFingerprint) -> Vec<String> {
        let language = fingerprint.language.as_code();
        vec![
            self.build_topic(language, &self.os_audience()),
            self.build_topic(language, ALL_USERS_AUDIENCE),
            self.build_topic(language, &self.country_audience(&fingerprint.country)),
            self.build_topic(language, &self.version_audience(&fingerprint.app_version)),
        ]
    }

    fn os_audience(&self) -> String {
        format!("-os-{}", crate::fingerprint::PLATFORM)
    }

    fn country_audience(&self, country: &str) -> String {
        format!("-country-{country}")
    }

    fn version_audience(&self, version: &str) -> String {
        format!("-version-{version}")
    }

    fn build_topic(&self, language: &str, audience: &str) -> String {
        format!("{BASE_TOPIC}lang-{language}{AUDIENCE_SEPARATOR}{audience}")
    }
}
