use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for lectern.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (LECTERN_* prefix)
/// 3. Config file (~/.config/lectern/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: LECTERN_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/lectern/lectern.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Optional TOML manifest declaring extra procedures.
    ///
    /// Can be set via:
    /// - CLI: --manifest /path/to/procedures.toml
    /// - ENV: LECTERN_MANIFEST_PATH
    /// - Config: manifest_path = "/path/to/procedures.toml"
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logger settings handed to `twyg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_true")]
    pub coloured: bool,

    #[serde(default)]
    pub report_caller: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            coloured: true,
            report_caller: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            manifest_path: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/lectern/config.toml
    /// Reads environment variables with LECTERN_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("lectern");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Apply CLI overrides on top of the loaded configuration.
    #[must_use]
    pub fn with_overrides(mut self, db: Option<PathBuf>, manifest: Option<PathBuf>) -> Self {
        if let Some(db) = db {
            self.database_path = db;
        }
        if manifest.is_some() {
            self.manifest_path = manifest;
        }
        self
    }
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_true() -> bool {
    true
}

/// Get the default database path.
///
/// Returns: ~/.local/share/lectern/lectern.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lectern")
        .join("lectern.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/lectern/config.toml
/// - macOS: ~/Library/Application Support/lectern/config.toml
/// - Windows: %APPDATA%\lectern\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lectern")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Lectern Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (LECTERN_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database
#
# Holds authors, posts, embeddings and the stored procedure bodies.
#
# Can also be set via:
# - CLI: lectern --db /custom/path.db stats
# - Environment: LECTERN_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/lectern.db"

# Extra procedure contracts
#
# A TOML file with [[procedure]] tables. Those procedures become callable
# with `lectern call <name> [args...]` once their bodies are deployed.
#
# Can also be set via:
# - CLI: lectern --manifest /path/to/procedures.toml call ...
# - Environment: LECTERN_MANIFEST_PATH=/path/to/procedures.toml
#manifest_path = "/path/to/procedures.toml"

[logging]
# One of: trace, debug, info, warn, error
level = "info"
coloured = true
report_caller = false
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}
