//! Configuration pipeline: semantic gaps must fail startup, loudly and all
//! at once.

mod common;

use common::demo_config;
use vip_balancer::config::{parse_config, validate_config, ConfigError, ValidationError};

fn validation_errors(raw: &str) -> Vec<ValidationError> {
    match parse_config(raw) {
        Err(ConfigError::Validation(errors)) => errors,
        Err(other) => panic!("expected validation failure, got {other}"),
        Ok(_) => panic!("expected validation failure, config passed"),
    }
}

#[test]
fn demo_config_is_valid() {
    let config = demo_config();
    assert_eq!(config.backends.len(), 4);
    assert_eq!(config.endpoints.len(), 4);
    // 4 endpoints × 4 backends, fully covered.
    assert_eq!(config.paths.len(), 16);
}

#[test]
fn empty_backend_set_is_fatal() {
    let raw = r#"
        backends = []
        paths = []

        [virtual_service]
        ip = "10.0.0.100"
        mac = "00:00:00:00:00:fe"

        [[endpoints]]
        name = "h5"
        ip = "10.0.0.5"
        switch = "s5"
        port = 1
    "#;
    let errors = validation_errors(raw);
    assert!(errors.contains(&ValidationError::EmptyBackendSet));
}

#[test]
fn missing_path_entries_are_reported_per_pair() {
    // Drop every h8 path from the demo config.
    let mut config = demo_config();
    config.paths.retain(|p| p.endpoint != "h8");

    let errors = validate_config(&config).unwrap_err();
    for backend in ["h1", "h2", "h3", "h4"] {
        assert!(
            errors.contains(&ValidationError::MissingPath {
                endpoint: "h8".to_string(),
                backend: backend.to_string(),
            }),
            "expected missing-path error for h8 -> {backend}"
        );
    }
}

#[test]
fn static_ownership_requires_a_mac() {
    let mut config = demo_config();
    config.virtual_service.mac = None;
    let errors = validate_config(&config).unwrap_err();
    assert!(errors.contains(&ValidationError::StaticOwnershipWithoutMac));
}

#[test]
fn zero_priority_is_rejected() {
    let mut config = demo_config();
    config.rules.priority = 0;
    let errors = validate_config(&config).unwrap_err();
    assert!(errors.contains(&ValidationError::ZeroRulePriority));
}

#[test]
fn path_must_start_and_end_at_attachment_switches() {
    let mut config = demo_config();
    // Break the first entry: start it somewhere that is not h5's switch.
    config.paths[0].hops[0].switch = "s9".into();
    let errors = validate_config(&config).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::PathStartMismatch { .. })));

    let mut config = demo_config();
    let last = config.paths[0].hops.len() - 1;
    config.paths[0].hops[last].switch = "s9".into();
    let errors = validate_config(&config).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::PathEndMismatch { .. })));
}

#[test]
fn duplicate_path_entries_are_rejected() {
    let mut config = demo_config();
    let duplicate = config.paths[0].clone();
    config.paths.push(duplicate);
    let errors = validate_config(&config).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::DuplicatePath { .. })));
}

#[test]
fn all_errors_are_collected_not_just_the_first() {
    let mut config = demo_config();
    config.virtual_service.mac = None;
    config.rules.priority = 0;
    let errors = validate_config(&config).unwrap_err();
    assert!(errors.len() >= 2);
}

#[test]
fn parse_errors_are_distinct_from_validation_errors() {
    match parse_config("not = [valid") {
        Err(ConfigError::Parse(_)) => {}
        other => panic!("expected parse error, got {:?}", other.map(|_| ())),
    }
}
