//! Loading configuration from files on disk.

use std::io::Write;

use hodos_config::{ConfigError, ConfigLoader, LogFormat};

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_toml_file() {
    let file = write_temp(
        ".toml",
        r#"
        environment = "production"

        [logging]
        level = "hodos_routes=debug,info"
        format = "pretty"

        [docs]
        title = "Orders"
        version = "3.0.0"
        description = "Order management"
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert!(config.is_production());
    assert!(!config.include_internal_errors());
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.docs.description.as_deref(), Some("Order management"));
}

#[test]
fn loads_json_file() {
    let file = write_temp(".json", r#"{"errors": {"include_internal_errors": true}}"#);
    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert!(config.include_internal_errors());
}

#[test]
fn rejects_invalid_values_after_loading() {
    let file = write_temp(".toml", "[docs]\ntitle = \"\"\n");
    let err = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn rejects_unknown_extension() {
    let file = write_temp(".yaml", "environment: production\n");
    let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "yaml"));
}
