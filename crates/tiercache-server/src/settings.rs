//! Server settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file (`tiercache.toml` in the working directory, or the path in
//! `TIERCACHE_CONFIG`), then environment variables such as
//! `TIERCACHE__SERVER__PORT=9000`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use tiercache_sources::secrets::DEFAULT_ENV_PREFIX;

/// Environment variable holding an explicit settings file path.
pub const CONFIG_PATH_ENV: &str = "TIERCACHE_CONFIG";

/// Settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tiercache.toml";

/// Errors raised while loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub warm: WarmSettings,
    pub maintenance: MaintenanceSettings,
    pub secrets: SecretsSettings,
    pub tiers: Vec<TierSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarmSettings {
    /// How long a warm request waits for the run to finish.
    pub timeout_secs: u64,
}

impl Default for WarmSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaintenanceSettings {
    /// Interval of the expired-entry sweep; 0 disables it.
    pub purge_interval_secs: u64,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            purge_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretsProviderKind {
    Env,
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecretsSettings {
    pub provider: SecretsProviderKind,
    pub env_prefix: String,
    pub file: Option<PathBuf>,
}

impl Default for SecretsSettings {
    fn default() -> Self {
        Self {
            provider: SecretsProviderKind::Env,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Memory,
    Bounded,
}

/// Backing source a tier can be warmed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarmSource {
    Secrets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierSettings {
    pub name: String,
    pub kind: TierKind,
    #[serde(default)]
    pub ttl_secs: Option<u64>,
    #[serde(default)]
    pub max_capacity: Option<u64>,
    #[serde(default)]
    pub key_scoped: bool,
    #[serde(default)]
    pub warm: Option<WarmSource>,
}

impl TierSettings {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

fn tier(
    name: &str,
    kind: TierKind,
    ttl_secs: u64,
    max_capacity: Option<u64>,
    key_scoped: bool,
) -> TierSettings {
    TierSettings {
        name: name.to_string(),
        kind,
        ttl_secs: Some(ttl_secs),
        max_capacity,
        key_scoped,
        warm: None,
    }
}

/// Default tier set of the administration service.
pub fn default_tiers() -> Vec<TierSettings> {
    vec![
        tier("user-environment", TierKind::Memory, 300, None, true),
        tier("user-cases", TierKind::Bounded, 120, Some(10_000), true),
        tier("global-cases", TierKind::Bounded, 60, Some(1_000), false),
        TierSettings {
            warm: Some(WarmSource::Secrets),
            ..tier("secrets", TierKind::Memory, 3600, None, false)
        },
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            warm: WarmSettings::default(),
            maintenance: MaintenanceSettings::default(),
            secrets: SecretsSettings::default(),
            tiers: default_tiers(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, `TIERCACHE_CONFIG`, or `tiercache.toml`.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut builder = Config::builder();
        builder = match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };
        // Environment variable overrides, e.g., TIERCACHE__SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("TIERCACHE")
                .try_parsing(true)
                .separator("__"),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.tiers.is_empty() {
            return Err(SettingsError::Invalid(
                "at least one tier must be configured".to_string(),
            ));
        }
        if self.warm.timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "warm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        for tier in &self.tiers {
            if tier.name.trim().is_empty() {
                return Err(SettingsError::Invalid("tier name must not be empty".to_string()));
            }
            if tier.kind == TierKind::Bounded && tier.max_capacity.unwrap_or(0) == 0 {
                return Err(SettingsError::Invalid(format!(
                    "bounded tier '{}' requires max_capacity > 0",
                    tier.name
                )));
            }
            if tier.ttl_secs == Some(0) {
                return Err(SettingsError::Invalid(format!(
                    "tier '{}' has ttl_secs = 0; omit it for no expiry",
                    tier.name
                )));
            }
        }

        let warms_from_secrets = self
            .tiers
            .iter()
            .any(|t| t.warm == Some(WarmSource::Secrets));
        if warms_from_secrets
            && self.secrets.provider == SecretsProviderKind::File
            && self.secrets.file.is_none()
        {
            return Err(SettingsError::Invalid(
                "secrets.file is required when secrets.provider = \"file\"".to_string(),
            ));
        }

        Ok(())
    }

    pub fn addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| SettingsError::Invalid(format!("server address: {e}")))
    }

    pub fn warm_timeout(&self) -> Duration {
        Duration::from_secs(self.warm.timeout_secs)
    }

    /// Sweep interval, `None` when disabled.
    pub fn purge_interval(&self) -> Option<Duration> {
        (self.maintenance.purge_interval_secs > 0)
            .then(|| Duration::from_secs(self.maintenance.purge_interval_secs))
    }
}
