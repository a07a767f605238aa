use blockdupe::cli::Cli;
use blockdupe::config::{Config, ScanSettings};
use blockdupe::error::ConfigError;
use blockdupe::scanner::HashAlgorithm;
use clap::Parser;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
block_size = 4096
min_size = 0
hash = "sha256"
recursive = true
patterns = '.*\.jpg'
exclude_paths = [".git", "node_modules"]
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.block_size, 4096);
    assert_eq!(config.min_size, 0);
    assert_eq!(config.hash, HashAlgorithm::Sha256);
    assert!(config.recursive);
    assert_eq!(config.patterns.as_deref(), Some(r".*\.jpg"));
    assert_eq!(
        config.exclude_paths,
        vec![PathBuf::from(".git"), PathBuf::from("node_modules")]
    );
}

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "recursive = true\n").unwrap();

    let cli = Cli::try_parse_from(["blockdupe", "--config", config_path.to_str().unwrap()])
        .unwrap();
    let settings = ScanSettings::resolve(&cli).unwrap();

    assert!(settings.walker.recursive);
    assert_eq!(settings.block_size.get(), 1024);
    assert_eq!(settings.walker.min_size, 1);
    assert_eq!(settings.algorithm, HashAlgorithm::Md5);
}

#[test]
fn test_cli_flags_override_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "hash = \"sha256\"\nmin_size = 100\n").unwrap();

    let cli = Cli::try_parse_from([
        "blockdupe",
        "--config",
        config_path.to_str().unwrap(),
        "-H",
        "md5",
        "-S",
        "0",
        "some/root",
    ])
    .unwrap();
    let settings = ScanSettings::resolve(&cli).unwrap();

    assert_eq!(settings.algorithm, HashAlgorithm::Md5);
    assert_eq!(settings.walker.min_size, 0);
    assert_eq!(settings.roots, vec![PathBuf::from("some/root")]);
}

#[test]
fn test_zero_block_size_is_config_error() {
    let cli = Cli::try_parse_from(["blockdupe", "--no-config", "-B", "0"]).unwrap();
    let err = ScanSettings::resolve(&cli).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBlockSize(0)));
}

#[test]
fn test_bad_pattern_is_config_error() {
    let cli = Cli::try_parse_from(["blockdupe", "--no-config", "-P", "[unclosed"]).unwrap();
    let err = ScanSettings::resolve(&cli).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPattern { .. }));
}

#[test]
fn test_unknown_hash_in_file_is_config_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "hash = \"crc32\"\n").unwrap();

    let cli = Cli::try_parse_from(["blockdupe", "--config", config_path.to_str().unwrap()])
        .unwrap();
    let err = ScanSettings::resolve(&cli).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "this is not = = toml").unwrap();

    let cli = Cli::try_parse_from(["blockdupe", "--config", config_path.to_str().unwrap()])
        .unwrap();
    assert!(ScanSettings::resolve(&cli).is_err());
}
