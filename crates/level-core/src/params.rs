// ── Typed parameter structs for resource operations ──
//
// Each operation's inputs, with the query/body building that turns them
// into a Level request. Unset optional filters never reach the wire.

use level_api::device_id::parse_device_id;
use level_api::pagination::{ENDING_BEFORE, LIMIT, STARTING_AFTER};
use level_api::{
    CandidateQuery, DEFAULT_PAGE_SIZE, Error, KeyValuePair, Query, build_key_value_collection,
    sanitize_query,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default page size for a single (non-`return_all`) list request.
pub const DEFAULT_LIMIT: u32 = 50;

/// Largest page Level accepts.
pub const MAX_LIMIT: u32 = 100;

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

// ── Shared list options ─────────────────────────────────────────────

/// Paging and free-form options shared by every list operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOptions {
    #[serde(default)]
    pub return_all: bool,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending_before: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_query: Vec<KeyValuePair>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            return_all: false,
            limit: DEFAULT_LIMIT,
            starting_after: None,
            ending_before: None,
            extra_query: Vec::new(),
        }
    }
}

impl ListOptions {
    pub fn validate(&self) -> Result<(), Error> {
        if self.return_all || (1..=MAX_LIMIT).contains(&self.limit) {
            Ok(())
        } else {
            Err(Error::configuration(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {}",
                self.limit
            )))
        }
    }

    /// Limit sent on the first request: a full page when collecting all.
    pub fn request_limit(&self) -> u32 {
        if self.return_all {
            u32::try_from(DEFAULT_PAGE_SIZE).unwrap_or(MAX_LIMIT)
        } else {
            self.limit
        }
    }

    /// Build a query: `filters`, then cursors, then free-form pairs.
    fn build(&self, filters: CandidateQuery, with_limit: bool) -> Query {
        let mut candidate = if with_limit {
            CandidateQuery::new().set_value(LIMIT, self.request_limit())
        } else {
            CandidateQuery::new()
        };
        for (key, value) in filters.iter() {
            candidate = candidate.set(key, value.cloned());
        }
        sanitize_query(
            &candidate
                .set(STARTING_AFTER, self.starting_after.as_deref())
                .set(ENDING_BEFORE, self.ending_before.as_deref())
                .merge(build_key_value_collection(&self.extra_query)),
        )
    }
}

/// A list operation: knows how to build its first-page and paging queries.
pub trait ListParams {
    fn options(&self) -> &ListOptions;

    /// Resource-specific filters, unsanitized.
    fn filters(&self) -> CandidateQuery;

    /// Query for the first request, including `limit`.
    fn page_query(&self) -> Query {
        self.options().build(self.filters(), true)
    }

    /// Query carried across pages; the paginator adds cursor and `limit`.
    fn base_query(&self) -> Query {
        self.options().build(self.filters(), false)
    }
}

// ── Alerts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Active,
    Resolved,
    /// No status filter.
    All,
}

impl AlertStatus {
    fn as_query(self) -> Option<&'static str> {
        match self {
            Self::Active => Some("active"),
            Self::Resolved => Some("resolved"),
            Self::All => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertListParams {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Raw id or a device URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default)]
    pub status: AlertStatus,
}

impl ListParams for AlertListParams {
    fn options(&self) -> &ListOptions {
        &self.list
    }

    fn filters(&self) -> CandidateQuery {
        CandidateQuery::new()
            .set("device_id", self.device_id.as_deref().map(parse_device_id))
            .set("status", self.status.as_query())
    }
}

// ── Devices ─────────────────────────────────────────────────────────

/// Optional detail sections for device responses, sent only when enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct IncludeFlags {
    #[serde(default)]
    pub include_cpus: bool,
    #[serde(default)]
    pub include_disks: bool,
    #[serde(default)]
    pub include_memory: bool,
    #[serde(default)]
    pub include_network_interfaces: bool,
    #[serde(default)]
    pub include_operating_system: bool,
}

impl IncludeFlags {
    fn apply(self, candidate: CandidateQuery) -> CandidateQuery {
        candidate
            .flag("include_cpus", self.include_cpus)
            .flag("include_disks", self.include_disks)
            .flag("include_memory", self.include_memory)
            .flag("include_network_interfaces", self.include_network_interfaces)
            .flag("include_operating_system", self.include_operating_system)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceListParams {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor_group_id: Option<String>,
    #[serde(flatten)]
    pub include: IncludeFlags,
}

impl ListParams for DeviceListParams {
    fn options(&self) -> &ListOptions {
        &self.list
    }

    fn filters(&self) -> CandidateQuery {
        let candidate = CandidateQuery::new()
            .set("group_id", self.group_id.as_deref())
            .set("ancestor_group_id", self.ancestor_group_id.as_deref());
        self.include.apply(candidate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceGetParams {
    /// Raw id or a device URL.
    pub id: String,
    #[serde(flatten)]
    pub include: IncludeFlags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_query: Vec<KeyValuePair>,
}

impl DeviceGetParams {
    pub fn device_id(&self) -> String {
        parse_device_id(&self.id)
    }

    pub fn query(&self) -> Query {
        sanitize_query(
            &self
                .include
                .apply(CandidateQuery::new())
                .merge(build_key_value_collection(&self.extra_query)),
        )
    }
}

// ── Groups ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupListParams {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl ListParams for GroupListParams {
    fn options(&self) -> &ListOptions {
        &self.list
    }

    fn filters(&self) -> CandidateQuery {
        CandidateQuery::new().set("parent_id", self.parent_id.as_deref())
    }
}

// ── Single-record lookups ───────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetParams {
    pub id: String,
}

// ── Automations ─────────────────────────────────────────────────────

/// How the automation webhook body is supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AutomationPayload {
    /// A JSON object, or a string holding one. `""` means `{}`.
    Json { json_payload: Value },
    /// Device ids plus free-form parameters.
    Fields {
        #[serde(default)]
        device_ids: Vec<String>,
        #[serde(default)]
        custom_parameters: Vec<KeyValuePair>,
    },
}

impl Default for AutomationPayload {
    fn default() -> Self {
        Self::Fields {
            device_ids: Vec::new(),
            custom_parameters: Vec::new(),
        }
    }
}

impl AutomationPayload {
    /// Resolve the request body.
    pub fn to_body(&self) -> Result<Map<String, Value>, Error> {
        match self {
            Self::Json { json_payload } => json_body(json_payload),
            Self::Fields {
                device_ids,
                custom_parameters,
            } => Ok(fields_body(device_ids, custom_parameters)),
        }
    }
}

fn json_body(raw: &Value) -> Result<Map<String, Value>, Error> {
    let not_object = || Error::configuration("JSON payload must resolve to an object.");
    match raw {
        Value::Object(map) => Ok(map.clone()),
        Value::String(s) if s.is_empty() => Ok(Map::new()),
        Value::String(s) => {
            let parsed: Value = serde_json::from_str(s)
                .map_err(|_| Error::configuration("Invalid JSON payload."))?;
            match parsed {
                Value::Object(map) => Ok(map),
                _ => Err(not_object()),
            }
        }
        _ => Err(not_object()),
    }
}

fn fields_body(device_ids: &[String], custom_parameters: &[KeyValuePair]) -> Map<String, Value> {
    let mut body = Map::new();

    let ids: Vec<Value> = device_ids
        .iter()
        .map(|raw| parse_device_id(raw))
        .filter(|id| !id.is_empty())
        .map(Value::String)
        .collect();
    if !ids.is_empty() {
        body.insert("device_ids".into(), Value::Array(ids));
    }

    for (key, value) in build_key_value_collection(custom_parameters) {
        if key == "device_ids" {
            continue;
        }
        body.insert(key, Value::String(value));
    }

    body
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomationTriggerParams {
    /// Token from the automation's webhook trigger URL.
    pub token: String,
    #[serde(flatten)]
    pub payload: AutomationPayload,
}
