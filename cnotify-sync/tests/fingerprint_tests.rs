use cnotify_sync::fingerprint::{DEFAULT_APP_VERSION, PLATFORM};
use cnotify_sync::{AudienceFingerprint, FingerprintGenerator, Language};
use serial_test::serial;

// ── Language derivation ─────────────────────────────────────────

#[test]
fn known_primary_subtag_maps_to_language() {
    let generator = FingerprintGenerator::new("fr-CA", None);
    assert_eq!(generator.generate().language, Language::French);
}

#[test]
fn unknown_primary_subtag_maps_to_unknown() {
    let generator = FingerprintGenerator::new("xx-YY", None);
    assert_eq!(generator.generate().language, Language::Unknown);
}

#[test]
fn subtag_matching_is_case_insensitive() {
    let generator = FingerprintGenerator::new("EN-us", None);
    assert_eq!(generator.generate().language, Language::English);
}

#[test]
fn posix_locale_tag_is_handled() {
    let generator = FingerprintGenerator::new("de_DE.UTF-8", None);
    let fingerprint = generator.generate();
    assert_eq!(fingerprint.language, Language::German);
    assert_eq!(fingerprint.country, "de");
}

#[test]
fn empty_locale_yields_unknown() {
    let generator = FingerprintGenerator::new("", None);
    let fingerprint = generator.generate();
    assert_eq!(fingerprint.language, Language::Unknown);
    assert_eq!(fingerprint.country, "unknown");
}

#[test]
fn language_from_subtag_covers_known_codes() {
    for (subtag, language) in [
        ("ar", Language::Arabic),
        ("zh", Language::Chinese),
        ("en", Language::English),
        ("fr", Language::French),
        ("de", Language::German),
        ("id", Language::Indonesian),
        ("it", Language::Italian),
        ("ja", Language::Japanese),
        ("ko", Language::Korean),
        ("pt", Language::Portuguese),
        ("ru", Language::Russian),
        ("es", Language::Spanish),
        ("tr", Language::Turkish),
    ] {
        assert_eq!(Language::from_subtag(subtag), language);
        assert_eq!(language.as_code(), subtag);
    }
    assert_eq!(Language::from_subtag("nl"), Language::Unknown);
}

// ── Country and version fields ──────────────────────────────────

#[test]
fn country_repeats_the_language_subtag() {
    // Compatibility behavior: the country segment is the primary language
    // subtag, not the region subtag.
    let generator = FingerprintGenerator::new("en-US", None);
    assert_eq!(generator.generate().country, "en");
}

#[test]
fn app_version_defaults_when_unset() {
    let generator = FingerprintGenerator::new("en-US", None);
    assert_eq!(generator.generate().app_version, DEFAULT_APP_VERSION);
}

#[test]
fn app_version_is_carried_through() {
    let generator = FingerprintGenerator::new("en-US", Some("2.0".to_string()));
    assert_eq!(generator.generate().app_version, "2.0");
}

#[test]
fn platform_is_fixed() {
    let generator = FingerprintGenerator::new("ja-JP", None);
    assert_eq!(generator.generate().platform, PLATFORM);
}

// ── Wire shape ──────────────────────────────────────────────────

#[test]
fn fingerprint_serializes_with_wire_keys() {
    let fingerprint = FingerprintGenerator::new("fr-CA", Some("3.1".to_string())).generate();
    let json = serde_json::to_value(&fingerprint).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "language": "fr",
            "platform": "web",
            "country": "fr",
            "appVersion": "3.1"
        })
    );
}

#[test]
fn fingerprint_serde_roundtrip() {
    let fingerprint = FingerprintGenerator::new("tr-TR", Some("9".to_string())).generate();
    let json = serde_json::to_string(&fingerprint).unwrap();
    let back: AudienceFingerprint = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fingerprint);
}

#[test]
fn unknown_language_serializes_as_sentinel() {
    let json = serde_json::to_string(&Language::Unknown).unwrap();
    assert_eq!(json, "\"unknown\"");
}

// ── Environment-derived locale ──────────────────────────────────

#[test]
#[serial]
fn from_env_prefers_lc_all() {
    unsafe {
        std::env::set_var("LC_ALL", "es-MX");
        std::env::set_var("LANG", "en-US");
    }
    let generator = FingerprintGenerator::from_env(None);
    assert_eq!(generator.generate().language, Language::Spanish);
    unsafe {
        std::env::remove_var("LC_ALL");
        std::env::remove_var("LANG");
    }
}

#[test]
#[serial]
fn from_env_falls_back_to_lang() {
    unsafe {
        std::env::remove_var("LC_ALL");
        std::env::set_var("LANG", "pt_BR.UTF-8");
    }
    let generator = FingerprintGenerator::from_env(None);
    assert_eq!(generator.generate().language, Language::Portuguese);
    unsafe {
        std::env::remove_var("LANG");
    }
}

#[test]
#[serial]
fn from_env_without_locale_yields_unknown() {
    unsafe {
        std::env::remove_var("LC_ALL");
        std::env::remove_var("LANG");
    }
    let generator = FingerprintGenerator::from_env(None);
    assert_eq!(generator.generate().language, Language::Unknown);
}
