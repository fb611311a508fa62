//! Integration tests for loading configuration as the front end does.

use std::fs;

use par_mux::Config;
use par_mux::cli::commands::{config_path, finalize_config};
use par_mux::multiplexer::keys::PrefixKey;
use par_mux_config::{ConfigError, LogLevel};
use tempfile::tempdir;

#[test]
fn test_partial_file_fills_defaults() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("config.yaml");
    fs::write(
        &path,
        "bridge_url: wss://bridge.example/ssh\n\
         prefix_key: ctrl-b\n\
         history_capture:\n  settle_ms: 250\n\
         log_level: debug\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.bridge_url, "wss://bridge.example/ssh");
    assert_eq!(config.history_capture.settle_ms, 250);
    assert_eq!(
        config.history_capture.max_entries,
        par_mux_config::defaults::history_max_entries()
    );
    assert_eq!(config.cols, 80);
    assert_eq!(config.log_level, Some(LogLevel::Debug));
    assert!(PrefixKey::parse(&config.prefix_key).is_ok());
}

#[test]
fn test_zero_history_entries_rejected() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("config.yaml");
    fs::write(&path, "history_capture:\n  max_entries: 0\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    assert!(finalize_config(config, None).is_err());
}

#[test]
fn test_cli_bridge_url_repairs_bad_file_value() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("config.yaml");
    fs::write(&path, "bridge_url: http://old-bridge/ssh\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    let config = finalize_config(config, Some("ws://127.0.0.1:9000/ssh")).unwrap();
    assert_eq!(config.bridge_url, "ws://127.0.0.1:9000/ssh");
}

#[test]
fn test_config_path_override() {
    let temp = tempdir().unwrap();
    let custom = temp.path().join("mux.yaml");
    assert_eq!(config_path(Some(&custom)), custom);
    assert_eq!(config_path(None), Config::config_path());
}
