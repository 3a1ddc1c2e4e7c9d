// Hand-crafted async HTTP client for the Level REST API.
//
// Base URL: https://api.level.io/v2 (credential-overridable)
// Auth: raw API key in the Authorization header

use std::fmt;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::device_id::normalize_path_id;
use crate::envelope::into_array;
use crate::pagination::fetch_all_pages;
use crate::query::Query;
use crate::transport::TransportConfig;
use crate::Error;

// ── Error response shape from the Level API ──────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Collections ──────────────────────────────────────────────────────

/// A cursor-paginated Level collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Alerts,
    Devices,
    Groups,
}

impl Collection {
    /// Path segment under the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Alerts => "alerts",
            Self::Devices => "devices",
            Self::Groups => "groups",
        }
    }

    /// Singular display name, used in not-found errors.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Alerts => "Alert",
            Self::Devices => "Device",
            Self::Groups => "Group",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Level API.
///
/// Every request carries the API key as a sensitive default header.
/// Responses are kept as raw JSON; [`crate::envelope`] turns them into
/// record lists.
#[derive(Debug, Clone)]
pub struct LevelClient {
    http: reqwest::Client,
    base_url: Url,
}

impl LevelClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from credentials and transport config.
    pub fn from_credentials(
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let key = credentials.api_key.expose_secret();
        if key.trim().is_empty() {
            return Err(Error::configuration("Level API key is empty"));
        }

        let mut headers = HeaderMap::new();
        let mut key_value = HeaderValue::from_str(key).map_err(|e| Error::Authentication {
            message: format!("invalid API key header value: {e}"),
        })?;
        key_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, key_value);

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(credentials.base_url(), http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim())?;
        if url.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "base URL cannot carry a path: {raw}"
            )));
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&path);
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected at construction
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get(&self, segments: &[&str], query: &Query) -> Result<Value, Error> {
        let url = self.url(segments);
        let pairs = query.to_pairs();
        debug!("GET {url} params={pairs:?}");

        let mut req = self.http.get(url);
        if !pairs.is_empty() {
            req = req.query(&pairs);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post(&self, segments: &[&str], body: &Map<String, Value>) -> Result<Value, Error> {
        let url = self.url(segments);
        debug!("POST {url} fields={}", body.len());

        let mut req = self.http.post(url);
        if !body.is_empty() {
            req = req.json(body);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidApiKey;
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.message.or(err.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Generic collection access ────────────────────────────────────

    /// Fetch one page of a collection and unwrap its records.
    pub async fn list_page(
        &self,
        collection: Collection,
        query: &Query,
        explicit_property: Option<&str>,
    ) -> Result<Vec<Value>, Error> {
        let body = self.get(&[collection.path()], query).await?;
        Ok(into_array(body, explicit_property))
    }

    /// Fetch every page of a collection, optionally continuing from a page
    /// the caller already holds.
    pub async fn list_all(
        &self,
        collection: Collection,
        base_query: &Query,
        page_size: usize,
        explicit_property: Option<&str>,
        seed: Option<Vec<Value>>,
    ) -> Result<Vec<Value>, Error> {
        fetch_all_pages(base_query, page_size, seed, |query| async move {
            self.list_page(collection, &query, explicit_property).await
        })
        .await
    }

    /// Fetch a single record by id.
    ///
    /// Returns every record the envelope unwraps to; an empty result is a
    /// [`Error::NotFound`].
    pub async fn get_record(
        &self,
        collection: Collection,
        id: &str,
        query: &Query,
        explicit_property: Option<&str>,
    ) -> Result<Vec<Value>, Error> {
        let id = normalize_path_id(id.trim());
        if id.is_empty() {
            return Err(Error::configuration(format!(
                "{} id must not be empty",
                collection.singular()
            )));
        }

        let body = self.get(&[collection.path(), id.as_str()], query).await?;
        let records = into_array(body, explicit_property);
        if records.is_empty() {
            return Err(Error::NotFound {
                resource: collection.singular().into(),
                id,
            });
        }
        Ok(records)
    }

    // ── Automations ──────────────────────────────────────────────────

    /// Fire an automation's webhook trigger. The body is omitted when empty.
    pub async fn trigger_automation_webhook(
        &self,
        token: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, Error> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::configuration("automation webhook token must not be empty"));
        }
        self.post(&["automations", "webhooks", token], body).await
    }

    // ── Credential check ─────────────────────────────────────────────

    /// Verify the API key with a cheap authenticated request.
    pub async fn test_credentials(&self) -> Result<(), Error> {
        self.get(&[Collection::Groups.path()], &Query::new())
            .await
            .map(|_| ())
    }
}
