//! Unit tests for configuration and graceful degradation
//!
//! Tests cover:
//! - Missing TOML files fall back to defaults instead of failing
//! - Malformed TOML files are reported as configuration errors
//! - Root folder priority order (CLI > env > TOML > compiled default)
//! - Directory creation on demand
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate PAPILIO_ROOT_FOLDER are marked with #[serial].

use papilio_common::config::{
    load_toml, load_toml_or_default, CompiledDefaults, LoggingConfig, RootFolderInitializer,
    RootFolderResolver, ROOT_FOLDER_ENV,
};
use papilio_common::Error;
use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
struct SampleConfig {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    logging: LoggingConfig,
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.root_folder.to_string_lossy().contains("papilio"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new("test-module");
    let root_folder = resolver.resolve();

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(root_folder, defaults.root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    let test_path = "/tmp/papilio-test-env-folder";
    env::set_var(ROOT_FOLDER_ENV, test_path);

    let resolver = RootFolderResolver::new("test-module")
        .with_toml_root(Some(PathBuf::from("/tmp/papilio-toml-root")));
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, PathBuf::from(test_path));

    // Cleanup
    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/papilio-priority-env");

    let resolver = RootFolderResolver::new("test-module")
        .with_cli_override(Some(PathBuf::from("/tmp/papilio-priority-cli")));

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/papilio-priority-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_toml_used_when_env_absent() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new("test-module")
        .with_toml_root(Some(PathBuf::from("/tmp/papilio-toml-only")));

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/papilio-toml-only"));
}

#[test]
fn test_missing_toml_file_uses_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("does-not-exist.toml");

    let config: SampleConfig = load_toml_or_default(Some(&missing)).unwrap();

    assert_eq!(config.port, None);
    // Default impl of SampleConfig uses LoggingConfig::default()
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_toml_file_is_parsed() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("papilio-id.toml");
    std::fs::write(&path, "port = 5080\n\n[logging]\nlevel = \"debug\"\n").unwrap();

    let config: SampleConfig = load_toml_or_default(Some(&path)).unwrap();

    assert_eq!(config.port, Some(5080));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_logging_level_defaults_when_table_is_empty() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("papilio-id.toml");
    std::fs::write(&path, "[logging]\n").unwrap();

    let config: SampleConfig = load_toml(&path).unwrap();

    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_toml_is_config_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "port = \"not a number").unwrap();

    let result: Result<SampleConfig, Error> = load_toml_or_default(Some(&path));

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_initializer_creates_root_and_subdirectory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("nested").join("root");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();
    assert!(root.is_dir());

    let uploads = initializer
        .ensure_subdirectory(std::path::Path::new("uploads"))
        .unwrap();
    assert_eq!(uploads, root.join("uploads"));
    assert!(uploads.is_dir());
}
