use serial_test::serial;
use temp_env::with_vars;

use super::*;

fn cleanup_pimkit_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("PIMKIT__") {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = OrganizerConfig::default();

    assert_eq!(config.request.timeout_ms, 30_000);
    assert_eq!(config.expansion.max_generated_occurrences, 1000);
}

#[test]
#[serial]
fn load_should_merge_environment_overrides() {
    cleanup_pimkit_env_vars();
    with_vars(
        vec![("PIMKIT__REQUEST__TIMEOUT_MS", Some("5000"))],
        || {
            let config = OrganizerConfig::load(None).unwrap();

            assert_eq!(config.request.timeout_ms, 5000);
            assert_eq!(
                config.expansion.max_generated_occurrences, 1000,
                "untouched sections keep their defaults"
            );
        },
    );
}

#[test]
#[serial]
fn load_should_merge_file_settings() {
    cleanup_pimkit_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("organizer.toml");

    std::fs::write(
        &config_path,
        r#"
        [request]
        timeout_ms = 1500

        [expansion]
        max_generated_occurrences = 25
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let config = OrganizerConfig::load(config_path.to_str()).unwrap();

        assert_eq!(config.request.timeout_ms, 1500);
        assert_eq!(config.expansion.max_generated_occurrences, 25);
    });
}

#[test]
#[serial]
fn environment_variables_should_outrank_the_file() {
    cleanup_pimkit_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("organizer.toml");
    std::fs::write(
        &config_path,
        r#"
        [request]
        timeout_ms = 1500
        "#,
    )
    .unwrap();

    with_vars(
        vec![("PIMKIT__REQUEST__TIMEOUT_MS", Some("250"))],
        || {
            let config = OrganizerConfig::load(config_path.to_str()).unwrap();

            assert_eq!(config.request.timeout_ms, 250);
        },
    );
}

#[test]
fn validation_should_reject_a_zero_timeout() {
    let mut config = OrganizerConfig::default();
    config.request.timeout_ms = 0;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_a_zero_expansion_bound() {
    let mut config = OrganizerConfig::default();
    config.expansion.max_generated_occurrences = 0;

    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn load_should_fail_on_a_missing_file() {
    cleanup_pimkit_env_vars();
    let result = OrganizerConfig::load(Some("/nonexistent/organizer.toml"));

    assert!(result.is_err());
}
