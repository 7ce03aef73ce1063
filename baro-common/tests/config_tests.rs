//! Tests for configuration and root-folder resolution
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that manipulate BARO_ROOT_FOLDER or BARO_ROOT are marked with
//! #[serial] so they run sequentially, not in parallel.

use baro_common::config::{
    CompiledDefaults, ListenConfig, LoggingConfig, RootFolderInitializer, RootFolderResolver,
    TomlConfig, DATABASE_FILE,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.log_file.is_none());

    let path_str = defaults.root_folder.to_string_lossy();
    assert!(path_str.contains("barometre"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var("BARO_ROOT_FOLDER");
    env::remove_var("BARO_ROOT");

    // Module name that definitely has no config file
    let resolver = RootFolderResolver::new("nonexistent-test-module-12345");
    let root_folder = resolver.resolve();

    assert!(!root_folder.as_os_str().is_empty());

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(root_folder, defaults.root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_baro_root_folder() {
    let test_path = "/tmp/baro-test-env-folder";
    env::set_var("BARO_ROOT_FOLDER", test_path);

    let resolver = RootFolderResolver::new("test-module");
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, PathBuf::from(test_path));

    env::remove_var("BARO_ROOT_FOLDER");
}

#[test]
#[serial]
fn test_resolver_env_var_baro_root() {
    let test_path = "/tmp/baro-test-env-root";
    env::remove_var("BARO_ROOT_FOLDER");
    env::set_var("BARO_ROOT", test_path);

    let resolver = RootFolderResolver::new("test-module");
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, PathBuf::from(test_path));

    env::remove_var("BARO_ROOT");
}

#[test]
#[serial]
fn test_resolver_baro_root_folder_takes_precedence() {
    env::remove_var("BARO_ROOT_FOLDER");
    env::remove_var("BARO_ROOT");

    env::set_var("BARO_ROOT_FOLDER", "/tmp/baro-priority-1");
    env::set_var("BARO_ROOT", "/tmp/baro-priority-2");

    let resolver = RootFolderResolver::new("test-module");
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/baro-priority-1"));

    env::remove_var("BARO_ROOT_FOLDER");
    env::remove_var("BARO_ROOT");
}

#[test]
#[serial]
fn test_resolver_cli_arg_takes_precedence_over_env() {
    env::set_var("BARO_ROOT_FOLDER", "/tmp/baro-from-env");

    let resolver = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/baro-from-cli")));
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/baro-from-cli"));

    env::remove_var("BARO_ROOT_FOLDER");
}

#[test]
fn test_initializer_database_path() {
    let root = PathBuf::from("/tmp/baro-test-root");
    let initializer = RootFolderInitializer::new(root.clone());

    let db_path = initializer.database_path();
    assert_eq!(db_path, root.join(DATABASE_FILE));
}

#[test]
fn test_initializer_database_exists() {
    let root = PathBuf::from("/tmp/baro-test-nonexistent");
    let initializer = RootFolderInitializer::new(root);

    assert!(!initializer.database_exists());
}

#[test]
fn test_initializer_creates_directory() {
    let test_dir = format!("/tmp/baro-test-create-{}", std::process::id());
    let root = PathBuf::from(&test_dir);

    let _ = std::fs::remove_dir_all(&root);

    let initializer = RootFolderInitializer::new(root.clone());
    let result = initializer.ensure_directory_exists();

    assert!(result.is_ok(), "Failed to create directory: {:?}", result.err());
    assert!(root.exists(), "Directory was not created");
    assert!(root.is_dir(), "Created path is not a directory");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_initializer_idempotent_directory_creation() {
    let test_dir = format!("/tmp/baro-test-idempotent-{}", std::process::id());
    let root = PathBuf::from(&test_dir);

    let _ = std::fs::remove_dir_all(&root);

    let initializer = RootFolderInitializer::new(root.clone());

    assert!(initializer.ensure_directory_exists().is_ok());
    // Second call succeeds too
    assert!(initializer.ensure_directory_exists().is_ok());

    assert!(root.exists());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_initializer_nested_directory_creation() {
    let base = format!("/tmp/baro-test-nested-{}", std::process::id());
    let root = PathBuf::from(&base).join("level1").join("level2");

    let _ = std::fs::remove_dir_all(&base);

    let initializer = RootFolderInitializer::new(root.clone());
    let result = initializer.ensure_directory_exists();

    assert!(result.is_ok(), "Failed to create nested directories: {:?}", result.err());
    assert!(root.is_dir(), "Nested directory was not created");

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn test_toml_round_trip_with_listen_section() {
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/data/baro")),
        logging: LoggingConfig {
            level: Some("debug".to_string()),
            file: None,
        },
        listen: ListenConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
        },
    };

    let toml_str = toml::to_string(&config).unwrap();
    let parsed: TomlConfig = toml::from_str(&toml_str).unwrap();

    assert_eq!(parsed, config);
}

#[test]
fn test_toml_backward_compatible_missing_sections() {
    // Older config files without [listen] keep deserializing
    let toml_str = r#"
        root_folder = "/data/baro"
        [logging]
        level = "info"
    "#;

    let config: TomlConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/data/baro")));
    assert_eq!(config.logging.level, Some("info".to_string()));
    assert_eq!(config.listen.port, None);
}
