use secrecy::{ExposeSecret, SecretString};

/// Canonical Level API base URL. Older integrations pointed at `/v1`.
pub const DEFAULT_BASE_URL: &str = "https://api.level.io/v2";

/// Credentials for talking to Level.
///
/// The API key is sent verbatim in the `Authorization` header (no scheme).
/// The webhook secret is only consulted by the webhook receiver.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: SecretString,
    base_url: Option<String>,
    pub webhook_secret: Option<SecretString>,
}

impl Credentials {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: None,
            webhook_secret: None,
        }
    }

    /// Override the base URL. Blank values fall back to [`DEFAULT_BASE_URL`].
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = if url.trim().is_empty() {
            None
        } else {
            Some(url.trim().to_owned())
        };
        self
    }

    pub fn with_webhook_secret(mut self, secret: SecretString) -> Self {
        self.webhook_secret = if secret.expose_secret().is_empty() {
            None
        } else {
            Some(secret)
        };
        self
    }

    /// Effective base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}
