//! 設定ファイルのテスト

use scout_formatter::config::Config;
use scout_formatter::error::ScoutError;
use scout_formatter_common::ChunkProfile;
use tempfile::tempdir;

#[test]
fn test_load_missing_config_returns_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("config.json")).expect("読み込みに失敗");

    assert_eq!(config, Config::default());
    assert_eq!(config.shipping_cost, 0.0);
    assert_eq!(config.chunk_size, None);
    assert_eq!(config.profile, ChunkProfile::Desktop);
    assert_eq!(config.sanitize_id_threshold, 3);
    assert_eq!(config.sanitize_key_threshold, 2);
}

#[test]
fn test_save_and_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set_shipping_cost(1.25).unwrap();
    config.set_misc_cost(0.5).unwrap();
    config.set_chunk_size(800).unwrap();
    config.profile = ChunkProfile::Service;
    config.save_to(&path).expect("保存に失敗");

    let reloaded = Config::load_from(&path).expect("読み込みに失敗");
    assert_eq!(reloaded, config);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"profile\": \"service\""));
}

#[test]
fn test_partial_config_uses_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "shipping_cost": 2.0 }"#).unwrap();

    let config = Config::load_from(&path).expect("読み込みに失敗");
    assert_eq!(config.shipping_cost, 2.0);
    assert_eq!(config.misc_cost, 0.0);
    assert_eq!(config.sanitize_key_threshold, 2);
}

#[test]
fn test_invalid_config_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(ScoutError::JsonParse(_))));
}

#[test]
fn test_invalid_values_rejected() {
    let mut config = Config::default();
    assert!(matches!(config.set_chunk_size(0), Err(ScoutError::Config(_))));
    assert!(matches!(config.set_shipping_cost(-1.0), Err(ScoutError::Config(_))));
    assert!(matches!(config.set_misc_cost(f64::NAN), Err(ScoutError::Config(_))));
    assert_eq!(config, Config::default());
}

#[test]
fn test_process_options_from_config() {
    let config = Config {
        shipping_cost: 1.0,
        misc_cost: 2.0,
        chunk_size: Some(300),
        profile: ChunkProfile::Service,
        sanitize_id_threshold: 4,
        sanitize_key_threshold: 1,
    };
    let options = config.process_options();
    assert_eq!(options.shipping_cost, 1.0);
    assert_eq!(options.misc_cost, 2.0);
    assert_eq!(options.effective_chunk_size(10_000), 500);
    assert_eq!(options.sanitize.identifier_missing_max, 4);
    assert_eq!(options.sanitize.key_missing_max, 1);
}
