//! Persisted user configuration (`extpack.toml`)

use crate::options::{Browser, BuildOptions, ManifestVersion, OptionsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "EXTPACK_CONFIG";

/// Pointer file (next to the default config) holding an alternate config path
pub const CONFIG_POINTER_FILE: &str = ".extpack_config_path";

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const CONFIG_KEYS: [&str; 4] = ["browser", "manifest-version", "src-dir", "build-dir"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<Browser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_version: Option<ManifestVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<String>,
}

impl Config {
    /// Default config directory (`~/.config/extpack`, platform config dir on Windows)
    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(not(target_os = "windows"))]
        let dir = dirs::home_dir().map(|home| home.join(".config").join("extpack"));

        #[cfg(target_os = "windows")]
        let dir = dirs::config_dir().map(|config| config.join("extpack"));

        dir
    }

    pub fn path() -> PathBuf {
        // Explicit override for tests and isolated runs.
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let dir = Self::config_dir().unwrap_or_else(|| PathBuf::from(".extpack"));
        let default = dir.join("extpack.toml");

        let pointer = dir.join(CONFIG_POINTER_FILE);
        if pointer.exists() {
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
        }

        default
    }

    /// Path of the pointer file used by `extpack config path <NEW_PATH>`
    pub fn pointer_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from(".extpack"))
            .join(CONFIG_POINTER_FILE)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path())
    }

    /// Load from a specific path, returning an empty config if the file is missing
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(ConfigError::Io(path.to_path_buf(), err.to_string())),
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::path())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io(parent.to_path_buf(), e.to_string()))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "browser" => self.browser.map(|b| b.to_string()),
            "manifest-version" => self.manifest_version.map(|v| v.to_string()),
            "src-dir" => self.src_dir.clone(),
            "build-dir" => self.build_dir.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "browser" => self.browser = Some(value.parse()?),
            "manifest-version" => self.manifest_version = Some(value.parse()?),
            "src-dir" => self.src_dir = Some(value),
            "build-dir" => self.build_dir = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.browser.is_none()
            && self.manifest_version.is_none()
            && self.src_dir.is_none()
            && self.build_dir.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    /// Merge configured defaults into build options.
    ///
    /// Explicit `browser`/`version` (from CLI flags) win over the config
    /// file, which wins over [`BuildOptions::default`].
    pub fn build_options(
        &self,
        browser: Option<Browser>,
        version: Option<ManifestVersion>,
    ) -> BuildOptions {
        let defaults = BuildOptions::default();
        BuildOptions {
            browser: browser.or(self.browser).unwrap_or(defaults.browser),
            manifest_version: version
                .or(self.manifest_version)
                .or(defaults.manifest_version),
        }
    }
}

/// Errors for config file operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(PathBuf, String),
    Parse { path: PathBuf, message: String },
    Serialize(String),
    UnknownKey(String),
    InvalidValue(OptionsError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, message) => {
                write!(f, "Config IO error at {}: {}", path.display(), message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Failed to parse config {}: {}", path.display(), message)
            }
            ConfigError::Serialize(message) => write!(f, "Failed to serialize config: {}", message),
            ConfigError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {}. Supported keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            ),
            ConfigError::InvalidValue(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<OptionsError> for ConfigError {
    fn from(err: OptionsError) -> Self {
        ConfigError::InvalidValue(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::default();
        assert!(config.is_empty());
        assert!(config.values_iter().is_empty());
    }

    #[test]
    fn test_config_set_get() {
        let mut config = Config::default();
        assert!(config.set("browser", "firefox".to_string()).is_ok());
        assert!(config.set("src-dir", "src".to_string()).is_ok());
        assert_eq!(config.get("browser"), Some("firefox".to_string()));
        assert_eq!(config.get("src-dir"), Some("src".to_string()));
        assert!(!config.is_empty());
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("manifest-version", "mv9".to_string()),
            Err(ConfigError::InvalidValue(OptionsError::UnknownManifestVersion(_)))
        ));
        assert_eq!(
            config.set("unknown-key", "value".to_string()),
            Err(ConfigError::UnknownKey("unknown-key".to_string()))
        );
        assert!(config.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("nested").join("extpack.toml");

        let mut config = Config::default();
        assert!(config.set("manifest-version", "mv2".to_string()).is_ok());
        assert!(config.set("build-dir", "dist".to_string()).is_ok());
        assert!(config.save_to_path(&path).is_ok());

        let content = fs::read_to_string(&path).unwrap_or_default();
        assert!(content.contains("manifest-version = \"mv2\""));

        let loaded = Config::load_from_path(&path);
        assert_eq!(loaded, Ok(config));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let loaded = Config::load_from_path(&temp_dir.path().join("missing.toml"));
        assert!(loaded.is_ok_and(|c| c.is_empty()));
    }

    #[test]
    fn test_load_invalid_toml() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("extpack.toml");
        assert!(fs::write(&path, "browser = [").is_ok());
        assert!(matches!(
            Config::load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_build_options_precedence() {
        let config = Config {
            browser: Some(Browser::Firefox),
            manifest_version: Some(ManifestVersion::Mv2),
            ..Default::default()
        };

        let from_config = config.build_options(None, None);
        assert_eq!(from_config.browser, Browser::Firefox);
        assert_eq!(from_config.selected_version(), ManifestVersion::Mv2);

        let from_flags = config.build_options(Some(Browser::Edge), Some(ManifestVersion::Mv3));
        assert_eq!(from_flags.target(), "edge-mv3");

        let defaults = Config::default().build_options(None, None);
        assert_eq!(defaults, BuildOptions::default());
    }
}
