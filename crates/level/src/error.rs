//! CLI error types with miette diagnostics.
//!
//! Maps library errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use level_config::ConfigError;
use level_core::ItemError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach Level at {url}")]
    #[diagnostic(
        code(level::connection_failed),
        help(
            "Check network access and the configured base URL.\n\
             Try: level config test"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(level::timeout),
        help("Increase timeout with --timeout or LEVEL_TIMEOUT.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(level::auth_failed),
        help(
            "Verify the API key under Settings > API keys in Level.\n\
             Store a new one with: level config init --api-key <KEY> --keyring"
        )
    )]
    AuthFailed { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(level::no_credentials),
        help(
            "Configure credentials with: level config init --api-key <KEY> --keyring\n\
             Or set the LEVEL_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Level refused the request (HTTP {status}): {message}")]
    #[diagnostic(
        code(level::forbidden),
        help("The API key lacks permission for this resource.")
    )]
    Forbidden { status: u16, message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(level::not_found),
        help("Run: level {list_command} to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Level API error (HTTP {status}): {message}")]
    #[diagnostic(code(level::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from Level: {message}")]
    #[diagnostic(code(level::bad_response), help("Re-run with -vv to see the raw body."))]
    BadResponse { message: String },

    #[error("Item {item_index} failed")]
    #[diagnostic(
        code(level::item_failed),
        help("Use --continue-on-fail to record failures and keep going.")
    )]
    ItemFailed {
        item_index: usize,
        #[source]
        source: Box<CliError>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(level::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(level::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: level config init --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(level::config))]
    Config(Box<ConfigError>),

    // ── Webhook ──────────────────────────────────────────────────────

    #[error("Webhook receiver failed: {message}")]
    #[diagnostic(code(level::webhook))]
    Webhook { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(level::json), help("Check the JSON input and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            Self::ItemFailed { source, .. } => source.exit_code(),
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error → CliError mapping ─────────────────────────────────

impl From<level_api::Error> for CliError {
    fn from(err: level_api::Error) -> Self {
        use level_api::Error;

        match err {
            Error::Configuration { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            Error::Authentication { message } => CliError::AuthFailed { message },

            Error::InvalidApiKey => CliError::AuthFailed {
                message: "Level rejected the API key".into(),
            },

            Error::Transport(e) if e.is_timeout() => CliError::Timeout,

            Error::Transport(e) => CliError::ConnectionFailed {
                url: e.url().map(ToString::to_string).unwrap_or_default(),
                source: Box::new(e),
            },

            Error::InvalidUrl(e) => CliError::Validation {
                field: "base_url".into(),
                reason: e.to_string(),
            },

            Error::Api { status, message } if status == 403 => {
                CliError::Forbidden { status, message }
            }

            Error::Api { status, message } => CliError::ApiError { status, message },

            Error::NotFound { resource, id } => {
                let list_command = format!("{}s list", resource.to_lowercase());
                CliError::NotFound {
                    resource_type: resource,
                    identifier: id,
                    list_command,
                }
            }

            Error::Deserialization { message, body } => {
                tracing::debug!(%body, "undecodable response body");
                CliError::BadResponse { message }
            }
        }
    }
}

impl From<ItemError> for CliError {
    fn from(err: ItemError) -> Self {
        CliError::ItemFailed {
            item_index: err.item_index,
            source: Box::new(err.source.into()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}
