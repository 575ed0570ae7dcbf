use formguard_core::{ConfigError, FormGuard, GuardConfig};
use std::io::Write;

#[test]
fn loads_config_file_and_builds_guard() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"dismiss_selector": "[data-close]", "messages": {{"file_missing": "Dosya secin."}}}}"#
    )
    .unwrap();

    let config = GuardConfig::from_path(file.path()).unwrap();
    assert_eq!(config.dismiss_selector, "[data-close]");
    assert_eq!(config.messages.file_missing, "Dosya secin.");

    let guard = FormGuard::new(config).unwrap();
    assert_eq!(guard.config().invalid_class, "is-invalid");
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = GuardConfig::from_path(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn guard_rejects_invalid_config() {
    let config = GuardConfig {
        invalid_class: String::new(),
        ..GuardConfig::default()
    };
    let err = FormGuard::new(config).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidClassName {
            field: "invalid_class",
            ..
        }
    ));
}
