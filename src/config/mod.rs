use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "rtimeclock";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// Sessions open longer than this are closed by the watchdog / sweep.
    #[serde(default = "default_max_session_minutes")]
    pub max_session_minutes: i64,
    #[serde(default = "default_watchdog_poll_seconds")]
    pub watchdog_poll_seconds: u64,
    /// `tracing` filter used when RTIMECLOCK_LOG is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_max_session_minutes() -> i64 {
    240
}
fn default_watchdog_poll_seconds() -> u64 {
    60
}
fn default_log_level() -> String {
    "warn".to_string()
}

/// Keys every config file is expected to carry.
pub const KNOWN_KEYS: [&str; 4] = [
    "database",
    "max_session_minutes",
    "watchdog_poll_seconds",
    "log_level",
];

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            max_session_minutes: default_max_session_minutes(),
            watchdog_poll_seconds: default_watchdog_poll_seconds(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(format!(".{}", APP_DIR))
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join(format!("{}.conf", APP_DIR))
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join(format!("{}.sqlite", APP_DIR))
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let mut cfg: Config = serde_yaml::from_str(content)?;
        cfg.validate()?;
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        Ok(cfg)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.max_session_minutes <= 0 {
            return Err(AppError::Config(format!(
                "max_session_minutes must be positive, got {}",
                self.max_session_minutes
            )));
        }
        if self.watchdog_poll_seconds == 0 {
            return Err(AppError::Config(
                "watchdog_poll_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn max_session(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::minutes(self.max_session_minutes)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.watchdog_poll_seconds)
    }

    /// Keys from KNOWN_KEYS that the YAML document does not set explicitly.
    pub fn missing_keys(content: &str) -> AppResult<Vec<&'static str>> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let map = value.as_mapping();
        Ok(KNOWN_KEYS
            .into_iter()
            .filter(|k| {
                map.map(|m| !m.contains_key(serde_yaml::Value::from(*k)))
                    .unwrap_or(true)
            })
            .collect())
    }

    /// `--db` value to a path: `~` is expanded, relative names live in the
    /// config directory.
    pub fn resolve_db_path(name: &str) -> PathBuf {
        let p = expand_tilde(name);
        if p.is_absolute() {
            p
        } else {
            Self::config_dir().join(p)
        }
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => Self::resolve_db_path(&name),
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            fs::create_dir_all(&dir)?;
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}
