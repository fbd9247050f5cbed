//! Configuration for the item list controller.
//!
//! TOML file + `FETCHLIST_*` environment overrides, layered with figment,
//! and translation to `fetchlist_core::ControllerConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fetchlist_core::{ControllerConfig, Grouping, TlsVerification};

/// Prefix for environment overrides, e.g. `FETCHLIST_ENDPOINT`.
pub const ENV_PREFIX: &str = "FETCHLIST_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// How fetched items are grouped for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// One collapsible group per `listId`.
    #[default]
    ListId,
    /// A single sorted list.
    Flat,
}

impl From<GroupingMode> for Grouping {
    fn from(mode: GroupingMode) -> Self {
        match mode {
            GroupingMode::ListId => Grouping::ListId,
            GroupingMode::Flat => Grouping::Flat,
        }
    }
}

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Full URL of the JSON item collection.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub grouping: GroupingMode,

    /// Background refresh interval in seconds. 0 = never.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            grouping: GroupingMode::default(),
            refresh_interval_secs: 0,
        }
    }
}

fn default_endpoint() -> String {
    fetchlist_core::config::DEFAULT_ENDPOINT.into()
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "fetchlist", "fetchlist").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fetchlist");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ControllerConfig` from a loaded `Config`.
pub fn to_controller_config(cfg: &Config) -> Result<ControllerConfig, ConfigError> {
    let endpoint: url::Url = cfg.endpoint.parse().map_err(|_| ConfigError::Validation {
        field: "endpoint".into(),
        reason: format!("invalid URL: {}", cfg.endpoint),
    })?;

    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("expected an http(s) URL, got scheme '{}'", endpoint.scheme()),
        });
    }

    if cfg.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let tls = if cfg.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ControllerConfig {
        endpoint,
        tls,
        timeout: Duration::from_secs(cfg.timeout),
        grouping: cfg.grouping.into(),
        refresh_interval_secs: cfg.refresh_interval_secs,
    })
}
