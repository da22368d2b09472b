//! Configuration loading and validation.
//!
//! Loads `config.toml` from `$MESSAGING_DEMO_CONFIG`, an explicit path, or
//! `~/.messaging-demo/config.toml`. A missing default file means defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::messaging::stream::DEFAULT_CAPACITY;
use crate::messaging::{MessagingSettings, DEFAULT_INSTALLATION_ID};
use crate::provider::{CloseReason, SdkLogLevel};

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "MESSAGING_DEMO_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider credentials and adapter behaviour.
    pub messaging: MessagingConfig,
    /// Log output.
    pub logging: LoggingConfig,
    /// Scripted behaviour of the simulated provider.
    pub simulation: SimulationConfig,
}

/// Provider credentials and adapter behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Brand (account) identifier.
    pub brand_id: String,
    /// Host application identifier.
    pub application_id: String,
    /// Installation identifier reported to the provider.
    pub installation_id: Uuid,
    /// Debug build behaviour (verbose provider logging).
    pub debug: bool,
    /// Explicit provider log level.
    pub sdk_log_level: Option<SdkLogLevel>,
    /// Per-subscriber event buffer.
    pub stream_capacity: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            brand_id: "78100234".to_owned(),
            application_id: "pibc.messagingdemo".to_owned(),
            installation_id: DEFAULT_INSTALLATION_ID,
            debug: cfg!(debug_assertions),
            sdk_log_level: None,
            stream_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl MessagingConfig {
    /// Adapter settings derived from this section.
    pub fn settings(&self) -> MessagingSettings {
        MessagingSettings {
            debug: self.debug,
            installation_id: self.installation_id,
            sdk_log_level: self.sdk_log_level,
            stream_capacity: self.stream_capacity,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for rotated JSON logs; console only when unset.
    pub logs_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            logs_dir: None,
        }
    }
}

/// Scripted behaviour of the simulated provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Report a conversation as already open at startup.
    pub already_active: bool,
    /// Fail provider initialisation.
    pub fail_initialization: bool,
    /// Close reason name (`AGENT`, `CONSUMER`, `SYSTEM`) reported when a
    /// resolution is requested. Bare resolution when unset.
    pub close_reason: Option<String>,
}

impl SimulationConfig {
    /// Parsed close reason.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown reason name.
    pub fn close_reason(&self) -> Result<Option<CloseReason>> {
        self.close_reason
            .as_deref()
            .map(|name| {
                CloseReason::from_name(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown close reason: {name}"))
            })
            .transpose()
    }
}

impl Config {
    /// Load configuration with env overrides applied.
    ///
    /// `explicit` must exist when given; otherwise the resolved default path
    /// may be absent and defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the result
    /// fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with a custom env resolver (for testing).
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => load_config(path)?,
            None => {
                let path = match env(CONFIG_PATH_ENV) {
                    Some(p) => PathBuf::from(p),
                    None => config_dir()?.join("config.toml"),
                };
                if path.exists() {
                    load_config(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file found, using defaults");
                    Config::default()
                }
            }
        };
        config.apply_overrides(env);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML string (no env overrides).
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("MESSAGING_DEMO_BRAND_ID") {
            self.messaging.brand_id = v;
        }
        if let Some(v) = env("MESSAGING_DEMO_APPLICATION_ID") {
            self.messaging.application_id = v;
        }
        if let Some(v) = env("MESSAGING_DEMO_DEBUG") {
            match v.parse() {
                Ok(debug) => self.messaging.debug = debug,
                Err(_) => tracing::warn!(
                    var = "MESSAGING_DEMO_DEBUG",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("MESSAGING_DEMO_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Check values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.messaging.brand_id.trim().is_empty() {
            anyhow::bail!("messaging.brand_id must not be empty");
        }
        if self.messaging.application_id.trim().is_empty() {
            anyhow::bail!("messaging.application_id must not be empty");
        }
        if self.messaging.stream_capacity == 0 {
            anyhow::bail!("messaging.stream_capacity must be at least 1");
        }
        self.simulation.close_reason()?;
        Ok(())
    }
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    Ok(config)
}

/// Resolve the default config directory (`~/.messaging-demo/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".messaging-demo"))
}
