//! Shared configuration for the Level CLI and webhook receiver.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! per-profile `level_api::TransportConfig`. The CLI layers its flag
//! overrides on top and builds the `Credentials` itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use level_api::{TlsMode, TransportConfig};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "level";

/// Prefix for environment overrides of config keys.
pub const ENV_PREFIX: &str = "LEVEL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named Level accounts.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit, then `default_profile`,
    /// then `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
            .to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Address the webhook receiver binds to.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            listen: default_listen(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_listen() -> String {
    "127.0.0.1:8787".into()
}

/// A named Level account.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL; the public v2 endpoint when unset.
    pub base_url: Option<String>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Shared secret for webhook signatures (plaintext; prefer keyring).
    pub webhook_secret: Option<String>,

    /// Environment variable name containing the webhook secret.
    pub webhook_secret_env: Option<String>,

    /// Path to an extra CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "level", "level").map_or_else(
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
    p.push("level");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, then `LEVEL_*` overrides (`__` nests keys,
/// e.g. `LEVEL_DEFAULTS__TIMEOUT`). A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "loaded config");
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_account(profile_name: &str, secret: &str) -> String {
    format!("{profile_name}/{secret}")
}

fn env_secret(var: Option<&str>) -> Option<SecretString> {
    var.and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

fn keyring_secret(profile_name: &str, secret: &str) -> Option<SecretString> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name, secret))
        .ok()
        .and_then(|entry| entry.get_password().ok())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Resolve an API key: `api_key_env`, then the keyring, then plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(key) = env_secret(profile.api_key_env.as_deref()) {
        debug!(profile = profile_name, "API key from environment");
        return Ok(key);
    }

    if let Some(key) = keyring_secret(profile_name, "api-key") {
        debug!(profile = profile_name, "API key from keyring");
        return Ok(key);
    }

    if let Some(key) = profile.api_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(SecretString::from(key.to_owned()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the webhook secret through the same chain. `None` disables
/// signature checks.
pub fn resolve_webhook_secret(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    env_secret(profile.webhook_secret_env.as_deref())
        .or_else(|| keyring_secret(profile_name, "webhook-secret"))
        .or_else(|| {
            profile
                .webhook_secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| SecretString::from(s.to_owned()))
        })
}

/// Store the API key in the system keyring for `profile_name`.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name, "api-key"))?
        .set_password(key)?;
    Ok(())
}

/// Transport settings for a profile: its timeout (or the global default)
/// and optional CA certificate.
pub fn profile_transport(profile: &Profile, defaults: &Defaults) -> Result<TransportConfig, ConfigError> {
    let secs = profile.timeout.unwrap_or(defaults.timeout);
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let mut transport = TransportConfig::default().with_timeout(Duration::from_secs(secs));
    if let Some(ref ca) = profile.ca_cert {
        transport.tls = TlsMode::CustomCa(ca.clone());
    }
    Ok(transport)
}
