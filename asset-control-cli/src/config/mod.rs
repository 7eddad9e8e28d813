//! Runtime configuration
//!
//! Built once at startup from, in increasing precedence: built-in defaults,
//! the TOML config file, and environment variables (a `.env` file is loaded
//! into the environment by `main`). The resulting [`Config`] is passed by
//! reference into every command.

pub mod limits;

pub use limits::{LimitError, Limits, RULE_SET_VERSION};

use crate::api::http::{HttpConfig, redact_url};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const ENV_WEBHOOK_URL: &str = "ASSET_CONTROL_WEBHOOK_URL";
pub const ENV_FORECAST_ENDPOINT: &str = "ASSET_CONTROL_FORECAST_ENDPOINT";
pub const ENV_SPREADSHEET: &str = "ASSET_CONTROL_SPREADSHEET";
pub const ENV_TIMEZONE: &str = "ASSET_CONTROL_TIMEZONE";

const CONFIG_DIR_NAME: &str = "asset-control";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing configuration value '{key}'")]
    Missing { key: &'static str },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),
    #[error("'{key}' must be an http(s) URL, got '{value}'")]
    InvalidUrl { key: &'static str, value: String },
}

/// Where submitted rows are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    #[default]
    GoogleSheets,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub csv_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::GoogleSheets,
            csv_path: PathBuf::from("submissions.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub accept_invalid_certs: bool,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageConfig {
    pub title: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            title: "Alert".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the service account key file
    pub credentials: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub forecast_endpoint: Option<String>,
    /// Spreadsheet opened by name; rows go to its first sheet
    pub spreadsheet: String,
    /// IANA timezone for row timestamps; local time when unset
    pub timezone: Option<String>,
    pub notify_after_record_failure: bool,
    pub storage: StorageConfig,
    pub http: HttpSection,
    pub limits: Limits,
    pub message: MessageConfig,

    #[serde(skip)]
    source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: None,
            webhook_url: None,
            forecast_endpoint: None,
            spreadsheet: "asset_control".to_string(),
            timezone: None,
            notify_after_record_failure: false,
            storage: StorageConfig::default(),
            http: HttpSection::default(),
            limits: Limits::default(),
            message: MessageConfig::default(),
            source: None,
        }
    }
}

impl Config {
    /// Load from an explicit file, or the default location if it exists,
    /// then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// `<config dir>/asset-control/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// File this configuration was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Overlay values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_CREDENTIALS) {
            self.credentials = Some(PathBuf::from(path));
        }
        if let Some(url) = get(ENV_WEBHOOK_URL) {
            self.webhook_url = Some(url);
        }
        if let Some(url) = get(ENV_FORECAST_ENDPOINT) {
            self.forecast_endpoint = Some(url);
        }
        if let Some(name) = get(ENV_SPREADSHEET) {
            self.spreadsheet = name;
        }
        if let Some(tz) = get(ENV_TIMEZONE) {
            self.timezone = Some(tz);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;
        for (key, value) in [
            ("webhook_url", &self.webhook_url),
            ("forecast_endpoint", &self.forecast_endpoint),
        ] {
            if let Some(url) = value {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidUrl {
                        key,
                        value: redact_url(url),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn require_credentials(&self) -> Result<&Path, ConfigError> {
        self.credentials
            .as_deref()
            .ok_or(ConfigError::Missing { key: "credentials" })
    }

    pub fn require_webhook_url(&self) -> Result<&str, ConfigError> {
        self.webhook_url
            .as_deref()
            .ok_or(ConfigError::Missing { key: "webhook_url" })
    }

    pub fn require_forecast_endpoint(&self) -> Result<&str, ConfigError> {
        self.forecast_endpoint
            .as_deref()
            .ok_or(ConfigError::Missing {
                key: "forecast_endpoint",
            })
    }

    pub fn timezone(&self) -> Result<Option<Tz>, ConfigError> {
        match &self.timezone {
            None => Ok(None),
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidTimezone(name.clone())),
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::builder()
            .connect_timeout(Duration::from_secs(self.http.connect_timeout_secs))
            .request_timeout(Duration::from_secs(self.http.request_timeout_secs))
            .accept_invalid_certs(self.http.accept_invalid_certs)
            .build()
    }

    /// Copy safe to print: URL query strings (webhook tokens) are masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.webhook_url = copy.webhook_url.as_deref().map(redact_url);
        copy.forecast_endpoint = copy.forecast_endpoint.as_deref().map(redact_url);
        copy
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Commented starting point written by `config init`
    pub fn template() -> &'static str {
        r#"# asset-control configuration

# Service account key file (JSON). GOOGLE_APPLICATION_CREDENTIALS overrides.
credentials = "/path/to/service-account.json"

# Chat webhook receiving the alert. ASSET_CONTROL_WEBHOOK_URL overrides.
webhook_url = "https://oapi.dingtalk.com/robot/send?access_token=REPLACE_ME"

# Reporting endpoint returning the per-location forecast as a JSON array.
forecast_endpoint = "https://script.google.com/macros/s/REPLACE_ME/exec"

# Spreadsheet opened by name; rows are appended to its first sheet.
spreadsheet = "asset_control"

# IANA timezone for row timestamps (local time when unset).
# timezone = "Asia/Kuala_Lumpur"

# Send the alert even when appending the row failed.
notify_after_record_failure = false

[storage]
backend = "google-sheets"   # or "csv"
csv_path = "submissions.csv"

[http]
connect_timeout_secs = 10
request_timeout_secs = 30
accept_invalid_certs = false

[limits]
bag_max = 10000
small_cage_max = 1200
big_cage_max = 1200
pallet_max = 1200

[message]
title = "Alert"
"#
    }
}
