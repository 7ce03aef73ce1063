//! Configuration loading and root folder resolution
//!
//! The root folder holds `baro.db` and is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`BARO_ROOT_FOLDER`, then `BARO_ROOT`)
//! 3. TOML config file (`<config dir>/barometre/<module>.toml`)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file never terminates startup; resolution degrades
//! to the compiled defaults with a warning.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "baro.db";

/// Compiled per-platform defaults used when no other source applies
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("barometre"))
            .unwrap_or_else(|| PathBuf::from("./barometre_data"));

        CompiledDefaults {
            root_folder,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Logging section of the TOML config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Listen section of the TOML config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// On-disk TOML configuration. All fields optional so that older config
/// files keep deserializing as sections are added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub listen: ListenConfig,
}

impl TomlConfig {
    /// Load and parse a config file. Parse failures are reported as a
    /// warning and treated as an absent file.
    pub fn load(path: &Path) -> Option<TomlConfig> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring unparseable config file {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Resolves the root folder for one service following the 4-tier
/// priority order.
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        RootFolderResolver {
            module_name: module_name.to_string(),
            cli_arg: None,
        }
    }

    /// Supply the command-line override (priority 1)
    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Per-module config file path: `<config dir>/barometre/<module>.toml`
    pub fn config_file_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("barometre").join(format!("{}.toml", self.module_name)))
    }

    /// Config file contents, if a parseable file exists
    pub fn toml_config(&self) -> Option<TomlConfig> {
        let path = self.config_file_path()?;
        TomlConfig::load(&path)
    }

    /// Resolve the root folder. Never fails; falls back to the compiled
    /// platform default.
    pub fn resolve(&self) -> PathBuf {
        // Priority 1: command-line argument
        if let Some(path) = &self.cli_arg {
            debug!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        // Priority 2: environment variables
        if let Ok(path) = std::env::var("BARO_ROOT_FOLDER") {
            debug!("Root folder from BARO_ROOT_FOLDER: {}", path);
            return PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("BARO_ROOT") {
            debug!("Root folder from BARO_ROOT: {}", path);
            return PathBuf::from(path);
        }

        // Priority 3: TOML config file
        if let Some(config) = self.toml_config() {
            if let Some(root_folder) = config.root_folder {
                debug!("Root folder from config file: {}", root_folder.display());
                return root_folder;
            }
        }

        // Priority 4: compiled default
        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares a resolved root folder for use
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        RootFolderInitializer { root_folder }
    }

    /// Create the root folder (and parents) if missing. Idempotent.
    pub fn ensure_directory_exists(&self) -> crate::Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    /// Path of the database file inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
