use cnotify_sync::{FingerprintGenerator, TopicGenerator};

#[test]
fn topics_for_fingerprint_in_service_order() {
    let fingerprint = FingerprintGenerator::new("en-US", Some("2.0".to_string())).generate();
    let topics = TopicGenerator::new().topics(&fingerprint);

    assert_eq!(
        topics,
        vec![
            "cnotify_lang-en_aud-os-web".to_string(),
            "cnotify_lang-en_aud-all_users".to_string(),
            "cnotify_lang-en_aud-country-en".to_string(),
            "cnotify_lang-en_aud-version-2.0".to_string(),
        ]
    );
}

#[test]
fn unknown_language_uses_the_sentinel_code() {
    let fingerprint = FingerprintGenerator::new("xx-YY", None).generate();
    let topics = TopicGenerator::new().topics(&fingerprint);

    assert_eq!(topics[0], "cnotify_lang-unknown_aud-os-web");
    assert_eq!(topics[2], "cnotify_lang-unknown_aud-country-xx");
}

#[test]
fn default_version_appears_in_version_topic() {
    let fingerprint = FingerprintGenerator::new("fr-FR", None).generate();
    let topics = TopicGenerator::new().topics(&fingerprint);

    assert_eq!(topics[3], "cnotify_lang-fr_aud-version-default");
}
