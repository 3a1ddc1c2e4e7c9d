//! Config subcommand handlers.

use tabled::Tabled;

use level_api::LevelClient;
use level_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

fn save(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let path = level_config::save_config(cfg)?;
    if !global.quiet {
        eprintln!("Configuration written to {}", path.display());
    }
    Ok(())
}

/// Copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(MASK.into());
        }
        if profile.webhook_secret.is_some() {
            profile.webhook_secret = Some(MASK.into());
        }
    }
    cfg
}

fn set_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "base_url" | "base-url" => profile.base_url = Some(value),
        "api_key" | "api-key" => profile.api_key = Some(value),
        "api_key_env" | "api-key-env" => profile.api_key_env = Some(value),
        "webhook_secret" | "webhook-secret" => profile.webhook_secret = Some(value),
        "webhook_secret_env" | "webhook-secret-env" => profile.webhook_secret_env = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "timeout" => {
            let secs: u64 = value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?;
            if secs == 0 {
                return Err(CliError::Validation {
                    field: "timeout".into(),
                    reason: "must be at least 1 second".into(),
                });
            }
            profile.timeout = Some(secs);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: base_url, api_key, api_key_env, \
                     webhook_secret, webhook_secret_env, ca_cert, timeout"
                ),
            });
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Base URL")]
    base_url: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            name,
            base_url,
            api_key_env,
            keyring,
            plaintext,
            webhook_secret_env,
        } => {
            let mut cfg = level_config::load_config()?;
            let profile = cfg.profiles.entry(name.clone()).or_default();

            if let Some(url) = base_url {
                profile.base_url = Some(url);
            }
            if let Some(var) = api_key_env {
                profile.api_key_env = Some(var);
            }
            if let Some(var) = webhook_secret_env {
                profile.webhook_secret_env = Some(var);
            }

            match global.api_key.as_deref().filter(|k| !k.is_empty()) {
                Some(key) if keyring => {
                    level_config::store_api_key(&name, key)?;
                    if !global.quiet {
                        eprintln!("API key stored in system keyring");
                    }
                }
                Some(key) if plaintext => profile.api_key = Some(key.to_owned()),
                Some(_) => {
                    return Err(CliError::Validation {
                        field: "api_key".into(),
                        reason: "choose where to store it with --keyring or --plaintext".into(),
                    });
                }
                None => {}
            }

            if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }
            save(&cfg, global)?;
            if !global.quiet {
                eprintln!("Profile: {name}\nTest it: level config test --profile {name}");
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&level_config::load_config()?);
            let out = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|_| format!("{c:#?}")),
                |c| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = level_config::load_config()?;
            let active = config::active_profile_name(global, &cfg);
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort();
            let out = output::render_list(
                global.output,
                &names,
                |name| ProfileRow {
                    name: (*name).clone(),
                    default: if **name == active { "*" } else { "" }.into(),
                    base_url: cfg
                        .profiles
                        .get(*name)
                        .and_then(|p| p.base_url.clone())
                        .unwrap_or_else(|| level_api::DEFAULT_BASE_URL.into()),
                },
                |name| (*name).clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = level_config::load_config()?;
            let name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(name).or_default();
            set_value(profile, &key, value)?;
            save(&cfg, global)
        }

        ConfigCommand::Use { name } => {
            let mut cfg = level_config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
                available.sort_unstable();
                return Err(CliError::ProfileNotFound {
                    available: available.join(", "),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            save(&cfg, global)?;
            if !global.quiet {
                eprintln!("Default profile: {name}");
            }
            Ok(())
        }

        ConfigCommand::Test => {
            let cfg = level_config::load_config()?;
            let (credentials, transport) = config::resolve(global, &cfg)?;
            let client = LevelClient::from_credentials(&credentials, &transport)?;
            client.test_credentials().await?;
            if !global.quiet {
                eprintln!("API key accepted by {}", client.base_url());
            }
            Ok(())
        }
    }
}
