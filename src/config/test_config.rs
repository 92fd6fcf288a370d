use super::Config;
use rand;
use std::collections::HashMap;
use std::time::Duration;

fn full_vars() -> HashMap<&'static str, String> {
    HashMap::from([
        (
            "ENV_WEBHOOK_URL",
            format!("http://orchestrator.hotpotato.com/webhook/ext-ci/{}", rand::random::<u32>()),
        ),
        ("ENV_WEBHOOK_API_TOKEN", format!("token{}", rand::random::<u32>())),
        ("ENV_IMAGE_TAG", format!("org/app:{}", rand::random::<u16>())),
        ("ENV_IMAGE_DIGEST", format!("digest{}", rand::random::<u32>())),
    ])
}

#[test]
fn from_lookup_test_happy_path() {
    let vars = full_vars();
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    assert_eq!(config.webhook_url, vars["ENV_WEBHOOK_URL"]);
    assert_eq!(config.api_token, vars["ENV_WEBHOOK_API_TOKEN"]);
    assert_eq!(config.image_tag, vars["ENV_IMAGE_TAG"]);
    assert_eq!(config.image_digest, vars["ENV_IMAGE_DIGEST"]);
    assert!(config.request_timeout.is_none());
}

#[test]
fn from_lookup_test_with_timeout() {
    let mut vars = full_vars();
    vars.insert("ENV_WEBHOOK_TIMEOUT_SECS", " 30 ".to_string());
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
}

#[test]
fn from_lookup_test_bad_timeout() {
    let mut vars = full_vars();
    vars.insert("ENV_WEBHOOK_TIMEOUT_SECS", "soon".to_string());
    let result = Config::from_lookup(|key| vars.get(key).cloned());
    assert!(result.is_err());
}

#[test]
fn from_lookup_test_zero_timeout_rejected() {
    let mut vars = full_vars();
    vars.insert("ENV_WEBHOOK_TIMEOUT_SECS", "0".to_string());
    let error = match Config::from_lookup(|key| vars.get(key).cloned()) {
        Ok(_) => panic!("expected a zero timeout to be rejected"),
        Err(e) => e,
    };
    assert!(error.to_string().contains("greater than zero"));
}

#[test]
fn from_lookup_test_each_missing_required_var() {
    for missing in [
        "ENV_WEBHOOK_URL",
        "ENV_WEBHOOK_API_TOKEN",
        "ENV_IMAGE_TAG",
        "ENV_IMAGE_DIGEST",
    ] {
        let mut vars = full_vars();
        vars.remove(missing);
        let error = match Config::from_lookup(|key| vars.get(key).cloned()) {
            Ok(_) => panic!("expected failure without {}", missing),
            Err(e) => e,
        };
        assert!(error.to_string().contains(missing));
    }
}
