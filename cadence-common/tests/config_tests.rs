//! Library path resolution and config file loading
//!
//! Tests that touch CADENCE_LIBRARY_PATH are marked #[serial] so they do not
//! race each other on the process environment.

use cadence_common::config::{
    default_library_path, resolve_library_path, TomlConfig, LIBRARY_PATH_ENV,
};
use cadence_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

fn config_with_path(path: &str) -> TomlConfig {
    TomlConfig::from_toml_str(&format!("[library]\npath = \"{}\"\n", path)).unwrap()
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(LIBRARY_PATH_ENV, "/tmp/cadence-env/library.json");
    let config = config_with_path("/tmp/cadence-toml/library.json");

    let resolved = resolve_library_path(
        Some(Path::new("/tmp/cadence-cli/library.json")),
        LIBRARY_PATH_ENV,
        &config,
    );
    assert_eq!(resolved, PathBuf::from("/tmp/cadence-cli/library.json"));

    env::remove_var(LIBRARY_PATH_ENV);
}

#[test]
#[serial]
fn test_env_var_beats_config_file() {
    env::set_var(LIBRARY_PATH_ENV, "/tmp/cadence-env/library.json");
    let config = config_with_path("/tmp/cadence-toml/library.json");

    let resolved = resolve_library_path(None, LIBRARY_PATH_ENV, &config);
    assert_eq!(resolved, PathBuf::from("/tmp/cadence-env/library.json"));

    env::remove_var(LIBRARY_PATH_ENV);
}

#[test]
#[serial]
fn test_config_file_beats_default() {
    env::remove_var(LIBRARY_PATH_ENV);
    let config = config_with_path("/tmp/cadence-toml/library.json");

    let resolved = resolve_library_path(None, LIBRARY_PATH_ENV, &config);
    assert_eq!(resolved, PathBuf::from("/tmp/cadence-toml/library.json"));
}

#[test]
#[serial]
fn test_falls_back_to_platform_default() {
    env::remove_var(LIBRARY_PATH_ENV);

    let resolved = resolve_library_path(None, LIBRARY_PATH_ENV, &TomlConfig::default());
    assert_eq!(resolved, default_library_path());
}

#[test]
fn test_load_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[playback]\ncrossfade_seconds = 3").unwrap();

    let config = TomlConfig::load_or_default(Some(file.path())).unwrap();
    assert_eq!(config.playback.crossfade_seconds, 3);
    assert_eq!(config.playback.history_capacity, 100);
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let result = TomlConfig::load_or_default(Some(&missing));
    assert!(matches!(result, Err(Error::Config(_))));
}
