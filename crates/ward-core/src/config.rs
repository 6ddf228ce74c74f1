//! Configuration schema (ward.toml)

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "ward.toml";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "WARD_DATA_CONFIG_DIR";

/// Directory under the home directory used when the env var is unset
pub const DEFAULT_CONFIG_DIR: &str = ".ward";

/// Config key dbt projects use to mark a model as monitored
pub const DEFAULT_MONITORED_KEY: &str = "re_data_monitored";

/// Graph build settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSettings {
    /// Entity config key holding the monitoring flag
    #[serde(default = "default_monitored_key")]
    pub monitored_key: String,

    /// Show only monitored entities unless asked otherwise
    #[serde(default = "default_true")]
    pub monitored_only: bool,

    /// Collapse repeated edges between the same pair of nodes
    #[serde(default)]
    pub dedup_edges: bool,
}

fn default_monitored_key() -> String {
    DEFAULT_MONITORED_KEY.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            monitored_key: default_monitored_key(),
            monitored_only: true,
            dedup_edges: false,
        }
    }
}

/// Input artifact locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    /// dbt manifest.json
    #[serde(default = "default_manifest_path")]
    pub manifest: PathBuf,

    /// Monitoring data JSON (anomalies, schema changes, failed tests)
    #[serde(default = "default_monitoring_path")]
    pub monitoring: PathBuf,
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("target/manifest.json")
}

fn default_monitoring_path() -> PathBuf {
    PathBuf::from("target/ward/monitoring.json")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            manifest: default_manifest_path(),
            monitoring: default_monitoring_path(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Graph build settings
    #[serde(default)]
    pub graph: GraphSettings,

    /// Artifact paths (relative paths resolve against `project_root`)
    #[serde(default)]
    pub paths: PathSettings,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graph: GraphSettings::default(),
            paths: PathSettings::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_toml(&contents)?;

        // Relative artifact paths are relative to the config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Find and load the config file
    ///
    /// Looks at `./ward.toml`, then `$WARD_DATA_CONFIG_DIR/ward.toml`
    /// (default `~/.ward/ward.toml`). Returns `Ok(None)` when neither exists.
    pub fn discover() -> Result<Option<Self>, ConfigError> {
        Self::discover_in(Path::new("."), config_dir().as_deref())
    }

    /// Look for the config file in `project_dir`, then in `global_dir`
    pub fn discover_in(project_dir: &Path, global_dir: Option<&Path>) -> Result<Option<Self>, ConfigError> {
        let candidates = std::iter::once(project_dir).chain(global_dir);

        for dir in candidates {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.is_file() {
                return Self::from_file(&path).map(Some);
            }
        }

        Ok(None)
    }

    /// Resolve an artifact path against the project root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.manifest)
    }

    pub fn monitoring_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.monitoring)
    }
}

/// Global configuration directory
pub fn config_dir() -> Option<PathBuf> {
    config_dir_from(std::env::var_os(CONFIG_DIR_ENV))
}

/// Resolve the configuration directory from the raw env var value
fn config_dir_from(value: Option<OsString>) -> Option<PathBuf> {
    match value {
        Some(dir) if !dir.is_empty() => Some(expand_home(Path::new(&dir))),
        _ => dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_DIR)),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
