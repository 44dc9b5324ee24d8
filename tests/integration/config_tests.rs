use dupescout::config::{Config, ConfigError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("DUPESCOUT_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_config_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();

    assert_eq!(config.quick_hash_window, 8192);
    assert_eq!(config.full_hash_chunk, 65536);
    assert!(config.workers >= 1);
    assert!(config.ignore_patterns.is_empty());
}

#[test]
fn test_config_from_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
workers = 2
quick_hash_window = 4096
max_size = 1000000
exclude_regex = ["\\.bak$"]
include_empty = true
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();

    assert_eq!(config.workers, 2);
    assert_eq!(config.quick_hash_window, 4096);
    assert_eq!(config.max_size, Some(1_000_000));
    assert_eq!(config.exclude_regex, vec!["\\.bak$".to_string()]);
    assert!(config.include_empty);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "workers = 2\nskip_hidden = false\n").unwrap();

    std::env::set_var("DUPESCOUT_WORKERS", "16");
    std::env::set_var("DUPESCOUT_SKIP_HIDDEN", "true");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DUPESCOUT_"))
        .extract()
        .unwrap();

    clear_env();
    assert_eq!(config.workers, 16);
    assert!(config.skip_hidden);
}

#[test]
fn test_config_load_explicit_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("dupescout.toml");
    fs::write(&path, "workers = 3\nignore_patterns = [\"target/\"]\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.workers, 3);
    assert_eq!(config.ignore_patterns, vec!["target/".to_string()]);
}

#[test]
fn test_config_load_defers_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "workers = 0\n").unwrap();

    let mut config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.workers, 0);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "workers", .. })
    ));

    config.workers = 4;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_invalid_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "workers = [unclosed").unwrap();

    let result: Result<Config, _> = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract();
    assert!(result.is_err());
}

#[test]
fn test_config_missing_explicit_file() {
    let dir = tempdir().unwrap();
    let result = Config::load(Some(&dir.path().join("missing.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}
