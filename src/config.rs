//! Configuration for the Discord bot and the exporter
//!
//! Loads configuration from config.yml file, `.env` and environment variables.
//! The resulting [`Config`] is built once at startup and shared read-only.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default constants (fallback if config.yml not found)
pub const DEFAULT_PREFIX: &str = "!";
pub const PROGRESS_UPDATE_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_RECENT_COUNT: usize = 1000;
pub const BATCH_SIZE: usize = 5000;

/// Discord returns at most 100 messages per history request.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    discord: Option<DiscordConfig>,
    export: Option<ExportConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct DiscordConfig {
    token: Option<String>,
    prefix: Option<String>,
    require_admin: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportConfig {
    output_dir: Option<String>,
    progress_interval_secs: Option<u64>,
    recent_default: Option<usize>,
    page_size: Option<u8>,
    batch_size: Option<usize>,
    streaming: Option<bool>,
}

/// Export pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Overrides the platform downloads directory when set.
    pub output_dir: Option<PathBuf>,
    /// Minimum time between non-forced progress edits.
    pub progress_interval: Duration,
    /// Default count for `save_recent`.
    pub recent_default: usize,
    /// Messages requested per history page.
    pub page_size: u8,
    /// Records per flush in streaming mode.
    pub batch_size: usize,
    /// Write records to a `.part` file while collecting instead of buffering.
    pub streaming: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            progress_interval: PROGRESS_UPDATE_INTERVAL,
            recent_default: DEFAULT_RECENT_COUNT,
            page_size: MAX_PAGE_SIZE,
            batch_size: BATCH_SIZE,
            streaming: false,
        }
    }
}

/// Main configuration struct
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub prefix: String,
    pub require_admin: bool,
    pub export: ExportSettings,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("prefix", &self.prefix)
            .field("require_admin", &self.require_admin)
            .field("export", &self.export)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Load configuration from config.yml or use defaults
    /// Environment variables take precedence over config.yml values
    pub fn new() -> Self {
        Self::load_from_file("config.yml")
            .or_else(|_| Self::load_from_file("../config.yml"))
            .unwrap_or_else(|_| Self::defaults())
    }

    /// Resolve a value: prefer env var if config value looks like ${VAR}
    fn resolve_env_string(value: Option<String>, env_key: &str) -> Option<String> {
        if let Some(ref v) = value {
            if v.starts_with("${") && v.ends_with('}') {
                let var_name = &v[2..v.len() - 1];
                if let Ok(env_val) = std::env::var(var_name) {
                    return Some(env_val);
                }
            }
        }
        if let Ok(env_val) = std::env::var(env_key) {
            if !env_val.is_empty() {
                return Some(env_val);
            }
        }
        // An unresolved placeholder is as good as missing
        value.filter(|v| !(v.starts_with("${") && v.ends_with('}')))
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_dotenv();

        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Build configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let yaml: YamlConfig = if content.trim().is_empty() {
            YamlConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let discord = yaml.discord.unwrap_or_default();
        let export = yaml.export.unwrap_or_default();
        let defaults = ExportSettings::default();

        Ok(Self {
            token: Self::resolve_env_string(discord.token, TOKEN_ENV).unwrap_or_default(),
            prefix: discord
                .prefix
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            require_admin: discord.require_admin.unwrap_or(true),
            export: ExportSettings {
                output_dir: Self::resolve_env_string(export.output_dir, "EXPORT_OUTPUT_DIR")
                    .map(PathBuf::from),
                progress_interval: export
                    .progress_interval_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.progress_interval),
                recent_default: export.recent_default.unwrap_or(defaults.recent_default),
                page_size: export.page_size.unwrap_or(defaults.page_size),
                batch_size: export.batch_size.unwrap_or(defaults.batch_size),
                streaming: export.streaming.unwrap_or(defaults.streaming),
            },
        })
    }

    /// Create config with defaults; the token still comes from the environment
    fn defaults() -> Self {
        Self::load_dotenv();
        Self {
            token: Self::resolve_env_string(None, TOKEN_ENV).unwrap_or_default(),
            prefix: DEFAULT_PREFIX.to_string(),
            require_admin: true,
            export: ExportSettings {
                output_dir: Self::resolve_env_string(None, "EXPORT_OUTPUT_DIR").map(PathBuf::from),
                ..ExportSettings::default()
            },
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export.output_dir = Some(dir.into());
        self
    }

    /// Check the values the bot cannot start without
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::ConfigError(format!(
                "{} not set (use .env, config.yml or --token)",
                TOKEN_ENV
            )));
        }
        if self.prefix.is_empty() {
            return Err(Error::ConfigError("command prefix must not be empty".into()));
        }
        if self.export.page_size == 0 || self.export.page_size > MAX_PAGE_SIZE {
            return Err(Error::ConfigError(format!(
                "export.page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if self.export.batch_size == 0 {
            return Err(Error::ConfigError("export.batch_size must be positive".into()));
        }
        Ok(())
    }
}
