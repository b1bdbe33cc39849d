use logistics_core::config::LogisticsConfig;
use logistics_core::LogisticsError;

#[test]
fn test_parse_config_json_with_aliases() {
    let json = r#"{
        "server": { "bind": "127.0.0.1:9090" },
        "database": { "pool_size": 4 },
        "pdf_service": { "url": "http://gotenberg:3000", "timeout_secs": 30 }
    }"#;

    let config = LogisticsConfig::from_json_str(json).expect("Failed to parse config");

    assert_eq!(config.server.bind_address, "127.0.0.1:9090");
    assert_eq!(config.bind_address().unwrap().port(), 9090);
    assert_eq!(config.database.pool_size, 4);
    assert_eq!(config.database.busy_timeout_ms, 5000, "busy timeout should keep its default");
    assert_eq!(config.pdf_service.base_url, "http://gotenberg:3000");
    assert_eq!(config.pdf_service.timeout_secs, 30);
    assert_eq!(
        config.pdf_service.convert_path, "/forms/chromium/convert/html",
        "convert path should keep its default"
    );
}

#[test]
fn test_empty_json_gives_defaults() {
    let config = LogisticsConfig::from_json_str("{}").unwrap();
    assert_eq!(config.server.bind_address, "0.0.0.0:8000");
    assert_eq!(config.pdf_service.base_url, "http://localhost:3000");
}

#[test]
fn test_invalid_values_are_rejected() {
    let cases = [
        r#"{ "server": { "bind_address": "not an address" } }"#,
        r#"{ "database": { "pool_size": 0 } }"#,
        r#"{ "pdf_service": { "base_url": "  " } }"#,
        r#"{ "pdf_service": { "convert_path": "forms/chromium/convert/html" } }"#,
    ];

    for json in cases {
        let err = LogisticsConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, LogisticsError::Config(_)), "{} should be rejected", json);
    }
}

#[test]
fn test_malformed_json_is_config_error() {
    let err = LogisticsConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, LogisticsError::Config(_)));
}

#[test]
fn test_load_from_file_with_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logistics.json");
    std::fs::write(
        &path,
        r#"{ "pdf_service": { "base_url": "http://from-file:3000" }, "database": { "pool_size": 2 } }"#,
    )
    .unwrap();

    let config = LogisticsConfig::from_file(&path).unwrap();
    assert_eq!(config.pdf_service.base_url, "http://from-file:3000");
    assert_eq!(config.database.pool_size, 2);

    std::env::set_var("LOGISTICS__PDF_SERVICE__BASE_URL", "http://from-env:3000");
    let overridden = LogisticsConfig::from_file(&path);
    std::env::remove_var("LOGISTICS__PDF_SERVICE__BASE_URL");

    let overridden = overridden.unwrap();
    assert_eq!(overridden.pdf_service.base_url, "http://from-env:3000");
    assert_eq!(overridden.database.pool_size, 2);

    let missing = LogisticsConfig::from_file(dir.path().join("absent.json")).unwrap();
    assert_eq!(missing.database.pool_size, 8);
}
