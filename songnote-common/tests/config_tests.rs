//! Tests for config file resolution, loading and environment overrides
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate SONGNOTE_* variables are marked with #[serial].

use serial_test::serial;
use songnote_common::config::{
    load_config, resolve_config_path, ConfigOrigin, BOT_TOKEN_ENV, CHAT_ID_ENV, CHAT_ID_TEST_ENV,
    CONFIG_PATH_ENV,
};
use songnote_common::Error;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

fn clear_env() {
    env::remove_var(CONFIG_PATH_ENV);
    env::remove_var(BOT_TOKEN_ENV);
    env::remove_var(CHAT_ID_ENV);
    env::remove_var(CHAT_ID_TEST_ENV);
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("songnote.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
#[serial]
fn test_cli_path_wins_over_env() {
    clear_env();
    env::set_var(CONFIG_PATH_ENV, "/tmp/from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")));
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-cli.toml")));

    clear_env();
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    clear_env();
    env::set_var(CONFIG_PATH_ENV, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    clear_env();
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let (config, origin) = load_config(Some(&path)).unwrap();

    assert_eq!(origin, ConfigOrigin::Missing(path));
    assert_eq!(config.resolver.oembed_endpoint, "https://song.link/oembed");
    assert_eq!(config.telegram.bot_token, "");
}

#[test]
#[serial]
fn test_no_path_uses_defaults() {
    clear_env();
    let (config, origin) = load_config(None).unwrap();
    assert_eq!(origin, ConfigOrigin::Defaults);
    assert_eq!(config.logging.level, "info");
}

#[test]
#[serial]
fn test_file_values_loaded() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
        [telegram]
        bot_token = "123:file"
        chat_id = "-1001"
        chat_id_test = "-1002"

        [resolver]
        oembed_endpoint = "http://localhost:9999/oembed"
        overall_deadline_secs = 20
        page_heuristic = false

        [media]
        work_dir = "scratch"

        [logging]
        level = "debug"
        "#,
    );

    let (config, origin) = load_config(Some(&path)).unwrap();

    assert_eq!(origin, ConfigOrigin::File(path));
    assert_eq!(config.telegram.bot_token, "123:file");
    assert_eq!(config.telegram.chat_id_for(true).unwrap(), "-1002");
    assert_eq!(config.resolver.oembed_endpoint, "http://localhost:9999/oembed");
    assert_eq!(config.resolver.overall_deadline_secs, 20);
    assert!(!config.resolver.page_heuristic);
    assert_eq!(config.media.work_dir, PathBuf::from("scratch"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn test_env_overrides_file_secrets() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
        [telegram]
        bot_token = "123:file"
        chat_id = "-1001"
        "#,
    );
    env::set_var(BOT_TOKEN_ENV, "456:env");
    env::set_var(CHAT_ID_TEST_ENV, "-2002");

    let (config, _) = load_config(Some(&path)).unwrap();

    assert_eq!(config.telegram.bot_token, "456:env");
    assert_eq!(config.telegram.chat_id, "-1001");
    assert_eq!(config.telegram.chat_id_test, "-2002");

    clear_env();
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[telegram\nbot_token = ");

    let result = load_config(Some(&path));
    assert!(matches!(result, Err(Error::TomlParse(_))));
}
