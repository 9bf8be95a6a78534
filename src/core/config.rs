//! Configuration module for the import folder cleanup tool
//!
//! Supports loading configuration from a TOML file.
//! Configuration is stored in a standard location:
//! - Windows: %APPDATA%\import_folder_cleanup\config.toml
//! - Linux/macOS: ~/.config/import_folder_cleanup/config.toml
//!
//! The core workflows never read this themselves; the CLI loads it, applies
//! command-line overrides, and passes plain values in.

use crate::duplicate::{HashAlgorithm, TypeFilter};
use crate::naming::RenameRules;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application name used for config directory
const APP_NAME: &str = "import_folder_cleanup";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors from configuration handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the configuration directory")]
    ConfigDirNotFound,

    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),

    #[error("Failed to write {0}: {1}")]
    WriteError(PathBuf, String),

    #[error("Failed to open {0}: {1}")]
    OpenError(PathBuf, String),
}

/// Get the standard configuration directory for the application.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Get the standard configuration file path.
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Ensure the configuration directory exists.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let config_dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::WriteError(config_dir.clone(), e.to_string()))?;
    }

    Ok(config_dir)
}

/// Initialize the configuration file if it doesn't exist.
///
/// Returns the path to the config file.
pub fn init_config() -> Result<PathBuf, ConfigError> {
    let config_dir = ensure_config_dir()?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        let default_config = Config::generate_default_config();
        fs::write(&config_path, default_config)
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Open the configuration file in the default application.
pub fn open_config_in_editor() -> Result<PathBuf, ConfigError> {
    let config_path = init_config()?;

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", config_path.to_str().unwrap_or("")])
            .spawn()
            .map_err(|e| ConfigError::OpenError(config_path.clone(), e.to_string()))?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(&config_path)
            .spawn()
            .map_err(|e| ConfigError::OpenError(config_path.clone(), e.to_string()))?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(&config_path)
            .spawn()
            .map_err(|e| ConfigError::OpenError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder renaming settings
    pub rename: RenameConfig,

    /// File sorter settings
    pub sorter: SorterConfig,

    /// Folder cleanup settings
    pub cleanup: CleanupConfig,

    /// Duplicate finder settings
    pub duplicates: DuplicatesConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Folder renaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// Name-cleaning rules applied to every folder in scope
    #[serde(flatten)]
    pub rules: RenameRules,

    /// Rename each folder's files to the folder's name
    pub rename_files: bool,
}

/// File sorter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    /// Split images per extension instead of one `images` folder
    pub separate_images: bool,
}

/// Folder cleanup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Flatten single-level subfolders into their parent
    pub flatten: bool,

    /// Remove empty folders (deepest first)
    pub remove_empty: bool,

    /// Remove temp/cache files (Thumbs.db, *.part, ...)
    pub remove_temp: bool,

    /// Remove zero-byte media files
    pub remove_zero_byte_media: bool,

    /// Additional extensions to sweep out, e.g. ["bak", "old"]
    pub custom_extensions: Vec<String>,
}

/// Duplicate finder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicatesConfig {
    /// Minimum file size in KiB; smaller files are never compared
    pub min_size_kb: u64,

    /// Include subdirectories when scanning
    pub recursive: bool,

    /// Media files only, or every file
    pub type_filter: TypeFilter,

    /// Hash family used for both fingerprint passes
    pub algorithm: HashAlgorithm,

    /// Subfolder (under the scan root) that the move action fills
    pub move_subfolder: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log to file
    pub log_to_file: bool,

    /// Log file path
    pub log_file: PathBuf,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            rules: RenameRules::default(),
            rename_files: true,
        }
    }
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            separate_images: false,
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            flatten: true,
            remove_empty: true,
            remove_temp: true,
            remove_zero_byte_media: false,
            custom_extensions: Vec::new(),
        }
    }
}

impl Default for DuplicatesConfig {
    fn default() -> Self {
        Self {
            min_size_kb: 100,
            recursive: true,
            type_filter: TypeFilter::MediaOnly,
            algorithm: HashAlgorithm::Sha256,
            move_subfolder: "Duplicates".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: PathBuf::from("import-cleanup.log"),
        }
    }
}

impl Config {
    /// Load configuration from a specific file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from the standard location, falling back to
    /// defaults when no file exists yet.
    pub fn load_default() -> Result<Self, ConfigError> {
        match get_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Save configuration to a specific file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(path.to_path_buf(), e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(path.to_path_buf(), e.to_string()))?;
        }

        fs::write(path, contents)
            .map_err(|e| ConfigError::WriteError(path.to_path_buf(), e.to_string()))
    }

    /// Render the default configuration as a commented TOML document.
    pub fn generate_default_config() -> String {
        let body = toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# failed to render defaults\n"));
        format!(
            "# Import Folder Cleanup configuration\n\
             # Every value can be overridden on the command line.\n\n{}",
            body
        )
    }

    /// Minimum duplicate size in bytes.
    pub fn min_duplicate_size_bytes(&self) -> u64 {
        self.duplicates.min_size_kb * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.rename.rules.replace_underscores);
        assert!(config.rename.rules.title_case);
        assert_eq!(config.duplicates.min_size_kb, 100);
        assert_eq!(config.duplicates.algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.duplicates.move_subfolder, "Duplicates");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.duplicates.min_size_kb = 250;
        config.duplicates.algorithm = HashAlgorithm::Sha512;
        config.cleanup.custom_extensions = vec!["bak".to_string()];
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.duplicates.min_size_kb, 250);
        assert_eq!(loaded.duplicates.algorithm, HashAlgorithm::Sha512);
        assert_eq!(loaded.cleanup.custom_extensions, vec!["bak".to_string()]);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[duplicates]\nmin_size_kb = 5\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.duplicates.min_size_kb, 5);
        assert!(config.duplicates.recursive);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not [valid toml").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::ParseError(..))
        ));
    }

    #[test]
    fn test_generated_default_parses() {
        let rendered = Config::generate_default_config();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.duplicates.min_size_kb, 100);
    }

    #[test]
    fn test_min_size_conversion() {
        let mut config = Config::default();
        config.duplicates.min_size_kb = 2;
        assert_eq!(config.min_duplicate_size_bytes(), 2048);
    }
}
