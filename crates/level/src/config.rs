//! Resolution of CLI flags on top of the profile config.
//!
//! Precedence for every setting: flag or `LEVEL_*` env var, then the
//! active profile, then `[defaults]`.

use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;

use level_api::{Credentials, LevelClient, TransportConfig};
use level_config::{Config, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Determine the active profile name: `--profile`, then `default_profile`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

/// Find the active profile. A missing profile is only an error when it was
/// asked for by name and no API key flag can stand in for it.
fn resolve_profile(global: &GlobalOpts, cfg: &Config, name: &str) -> Result<Profile, CliError> {
    if let Some(profile) = cfg.profiles.get(name) {
        return Ok(profile.clone());
    }
    if global.profile.is_some() && global.api_key.is_none() {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: name.to_owned(),
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }
    Ok(Profile::default())
}

/// Credentials and transport for the active profile with flag overrides.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<(Credentials, TransportConfig), CliError> {
    let name = active_profile_name(global, cfg);
    let profile = resolve_profile(global, cfg, &name)?;

    let api_key = match global.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => SecretString::from(key.to_owned()),
        None => level_config::resolve_api_key(&profile, &name)?,
    };

    let mut credentials = Credentials::new(api_key);
    if let Some(url) = global.base_url.as_deref().or(profile.base_url.as_deref()) {
        credentials = credentials.with_base_url(url);
    }

    let mut transport = level_config::profile_transport(&profile, &cfg.defaults)?;
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        transport = transport.with_timeout(Duration::from_secs(secs));
    }

    tracing::debug!(profile = %name, base_url = credentials.base_url(), "resolved connection");
    Ok((credentials, transport))
}

/// Build an authenticated client from config and flags.
pub fn build_client(global: &GlobalOpts) -> Result<LevelClient, CliError> {
    let cfg = level_config::load_config()?;
    let (credentials, transport) = resolve(global, &cfg)?;
    Ok(LevelClient::from_credentials(&credentials, &transport)?)
}

/// Webhook secret: the flag, then the active profile's chain.
pub fn webhook_secret(global: &GlobalOpts, cfg: &Config, flag: Option<&str>) -> Option<SecretString> {
    if let Some(secret) = flag.filter(|s| !s.is_empty()) {
        return Some(SecretString::from(secret.to_owned()));
    }
    let name = active_profile_name(global, cfg);
    cfg.profiles
        .get(&name)
        .and_then(|profile| level_config::resolve_webhook_secret(profile, &name))
}

/// Listen address: the flag, then `[defaults].listen`.
pub fn listen_addr(cfg: &Config, flag: Option<SocketAddr>) -> Result<SocketAddr, CliError> {
    if let Some(addr) = flag {
        return Ok(addr);
    }
    cfg.defaults
        .listen
        .parse()
        .map_err(|e| CliError::Validation {
            field: "defaults.listen".into(),
            reason: format!("{e}"),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["level"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["groups", "list"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_profile() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                base_url: Some("https://profile.level.test/v2".into()),
                api_key: Some("profile-key".into()),
                timeout: Some(12),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let g = global(&[
            "--api-key",
            "flag-key",
            "--base-url",
            "https://flag.level.test/v2",
            "--timeout",
            "5",
        ]);
        let (creds, transport) = resolve(&g, &config_with_profile()).unwrap();
        assert_eq!(creds.api_key.expose_secret(), "flag-key");
        assert_eq!(creds.base_url(), "https://flag.level.test/v2");
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let (creds, transport) = resolve(&global(&[]), &config_with_profile()).unwrap();
        assert_eq!(creds.base_url(), "https://profile.level.test/v2");
        assert_eq!(transport.timeout, Duration::from_secs(12));
    }

    #[test]
    fn named_missing_profile_is_reported() {
        let g = global(&["--profile", "staging"]);
        let err = resolve(&g, &config_with_profile()).unwrap_err();
        assert!(matches!(
            err,
            CliError::ProfileNotFound { ref available, .. } if available == "default"
        ));
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        let g = global(&["--api-key", "k", "--timeout", "0"]);
        let err = resolve(&g, &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn listen_falls_back_to_defaults() {
        let addr = listen_addr(&Config::default(), None).unwrap();
        assert_eq!(addr.port(), 8787);
    }
}
