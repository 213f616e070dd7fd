//! Configuration at ~/.config/decacal/config.toml.
//!
//! Any value can be overridden from the environment with a `DECACAL_`
//! prefix and `__` between sections, e.g. `DECACAL_BACKEND__MODE=remote`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::backend::{AnyBackend, BackendMode, FallbackBackend, LocalBackend, RemoteBackend};
use crate::calendar::{
    CalendarSpec, DEFAULT_DAYS_PER_MONTH, DEFAULT_MONTH_NAMES, DEFAULT_WEEKDAY_NAMES,
};
use crate::date::CustomDate;
use crate::error::{DecacalError, DecacalResult};
use crate::store::{EventStore, RetryPolicy};

static DEFAULT_DATA_DIR: &str = "~/.local/share/decacal";
static DEFAULT_REMOTE_URL: &str = "http://127.0.0.1:8001";
const DEFAULT_SERVER_PORT: u16 = 8001;

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_today() -> CustomDate {
    CustomDate {
        year: 2025,
        month: 2,
        day: 15,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarSection {
    #[serde(default = "default_days_per_month")]
    pub days_per_month: u32,
    #[serde(default = "default_weekday_names")]
    pub weekday_names: Vec<String>,
    #[serde(default = "default_month_names")]
    pub month_names: Vec<String>,
}

fn default_days_per_month() -> u32 {
    DEFAULT_DAYS_PER_MONTH
}

fn default_weekday_names() -> Vec<String> {
    DEFAULT_WEEKDAY_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_month_names() -> Vec<String> {
    DEFAULT_MONTH_NAMES.iter().map(|s| s.to_string()).collect()
}

impl Default for CalendarSection {
    fn default() -> Self {
        CalendarSection {
            days_per_month: default_days_per_month(),
            weekday_names: default_weekday_names(),
            month_names: default_month_names(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,
    #[serde(default = "default_remote_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_remote_url() -> String {
    DEFAULT_REMOTE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    250
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            mode: BackendMode::default(),
            url: default_remote_url(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecacalConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_today")]
    pub default_today: CustomDate,

    #[serde(default)]
    pub calendar: CalendarSection,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for DecacalConfig {
    fn default() -> Self {
        DecacalConfig {
            data_dir: default_data_dir(),
            default_today: default_today(),
            calendar: CalendarSection::default(),
            backend: BackendConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl DecacalConfig {
    pub fn config_path() -> DecacalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DecacalError::Config("Could not determine config directory".into()))?
            .join("decacal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template on
    /// first run.
    pub fn load() -> DecacalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> DecacalResult<Self> {
        let config: DecacalConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("DECACAL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| DecacalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DecacalError::Config(e.to_string()))?;

        config.spec()?;
        config.default_today()?;

        Ok(config)
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn spec(&self) -> DecacalResult<CalendarSpec> {
        CalendarSpec::new(
            self.calendar.weekday_names.clone(),
            self.calendar.month_names.clone(),
            self.calendar.days_per_month,
        )
    }

    /// The configured default "today", checked against the calendar.
    pub fn default_today(&self) -> DecacalResult<CustomDate> {
        self.spec()?
            .validate(&self.default_today)
            .map_err(|e| DecacalError::Config(format!("default_today: {e}")))?;
        Ok(self.default_today)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            extra_attempts: self.backend.retry_attempts,
            delay: Duration::from_millis(self.backend.retry_delay_ms),
        }
    }

    pub fn backend(&self) -> DecacalResult<AnyBackend> {
        let remote = || {
            RemoteBackend::new(
                &self.backend.url,
                Duration::from_secs(self.backend.timeout_secs),
            )
        };

        Ok(match self.backend.mode {
            BackendMode::Local => AnyBackend::Local(LocalBackend::open(self.data_path())?),
            BackendMode::Remote => AnyBackend::Remote(remote()?),
            BackendMode::Fallback => AnyBackend::Fallback(FallbackBackend::new(
                remote()?,
                LocalBackend::open(self.data_path())?,
            )),
        })
    }

    /// Everything a front end needs: the store over the configured backend.
    pub fn event_store(&self) -> DecacalResult<EventStore<AnyBackend>> {
        Ok(EventStore::new(self.backend()?, Arc::new(self.spec()?)).with_retry(self.retry_policy()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DecacalResult<()> {
        let contents = format!(
            "\
# decacal configuration

# Where locally stored events live:
# data_dir = \"{}\"

# Date treated as today until you set one:
# default_today = {{ year = 2025, month = 2, day = 15 }}

# [calendar]
# days_per_month = {}
# weekday_names = [\"Peppermint Patty Day\", \"Bing Bong Day\", ...]
# month_names = [\"Revan\", \"Juno\", ...]

# [backend]
# \"local\", \"remote\" or \"fallback\" (remote with a local copy for reads)
# mode = \"local\"
# url = \"{}\"
# timeout_secs = 10
# retry_attempts = 1
# retry_delay_ms = 250

# [server]
# host = \"127.0.0.1\"
# port = {}
",
            DEFAULT_DATA_DIR, DEFAULT_DAYS_PER_MONTH, DEFAULT_REMOTE_URL, DEFAULT_SERVER_PORT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DecacalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DecacalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_template_loads_as_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        DecacalConfig::create_default_config(&path).unwrap();

        let config = DecacalConfig::load_from(&path).unwrap();
        assert_eq!(config.backend.mode, BackendMode::Local);
        assert_eq!(config.calendar.days_per_month, 30);
        assert_eq!(config.default_today().unwrap(), default_today());
        assert_eq!(config.spec().unwrap(), CalendarSpec::default());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "/tmp/decacal-test"
default_today = { year = 2025, month = 5, day = 20 }

[calendar]
days_per_month = 35

[backend]
mode = "fallback"
url = "http://calendar.example:9000"
retry_attempts = 3
"#,
        )
        .unwrap();

        let config = DecacalConfig::load_from(&path).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("/tmp/decacal-test"));
        assert_eq!(config.spec().unwrap().days_per_month(), 35);
        assert_eq!(config.default_today().unwrap().day, 20);
        assert_eq!(config.backend.mode, BackendMode::Fallback);
        assert_eq!(config.backend.url, "http://calendar.example:9000");
        assert_eq!(config.retry_policy().extra_attempts, 3);
        assert_eq!(config.backend.timeout_secs, 10);
    }

    #[test]
    fn test_default_today_must_fit_calendar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_today = { year = 2025, month = 2, day = 33 }\n").unwrap();

        assert!(matches!(
            DecacalConfig::load_from(&path),
            Err(DecacalError::Config(_))
        ));
    }

    #[test]
    fn test_local_backend_from_config() {
        let dir = TempDir::new().unwrap();
        let config = DecacalConfig {
            data_dir: dir.path().to_path_buf(),
            ..DecacalConfig::default()
        };
        let backend = config.backend().unwrap();
        assert_eq!(backend.mode(), BackendMode::Local);
    }
}
