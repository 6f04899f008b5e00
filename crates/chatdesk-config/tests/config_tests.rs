// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Chatdesk configuration system.

use chatdesk_config::diagnostic::ConfigError;
use chatdesk_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_chatdesk_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 9090
log_level = "debug"

[storage]
database_path = "/tmp/chatdesk-test.db"
wal_mode = false

[auth]
staff_domain = "staff.example"
min_pin_length = 6

[notify]
webhook_url = "https://hooks.example/incoming/abc"
app_base_url = "https://crm.example"
timeout_secs = 3

[[sites]]
id = "duke"
name = "Duke Street"

[[sites]]
id = "sten"
name = "St Enoch"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/chatdesk-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.auth.staff_domain, "staff.example");
    assert_eq!(config.auth.min_pin_length, 6);
    assert_eq!(
        config.notify.webhook_url.as_deref(),
        Some("https://hooks.example/incoming/abc")
    );
    assert_eq!(config.notify.timeout_secs, 3);
    assert_eq!(config.sites.len(), 2);
    assert_eq!(config.sites[1].id, "sten");
}

/// Unknown field in [server] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[server]
prot = 9090

[[sites]]
id = "duke"
name = "Duke Street"
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key must fail");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey { key, suggestion, .. } => Some((key, suggestion)),
            _ => None,
        })
        .expect("expected an UnknownKey error");
    assert_eq!(unknown.0, "prot");
    assert_eq!(unknown.1.as_deref(), Some("port"));
}

/// Wrong value type produces an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type_error() {
    let toml = r#"
[server]
port = "not-a-number"

[[sites]]
id = "duke"
name = "Duke Street"
"#;

    let errors = load_and_validate_str(toml).expect_err("wrong type must fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

/// Validation errors from an otherwise well-formed config are reported.
#[test]
fn missing_sites_fails_validation() {
    let errors = load_and_validate_str("").expect_err("no sites must fail validation");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { .. })));
}
