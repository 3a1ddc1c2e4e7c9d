// ── Device search by hostname ──
//
// Walks /devices with the cursor paginator's page rules, matching a
// case-insensitive hostname substring, until enough matches are found.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use level_api::pagination::{LIMIT, STARTING_AFTER, record_cursor};
use level_api::{Collection, DEFAULT_PAGE_SIZE, Error, LevelClient, Query};

/// Upper bound on matches returned per search call.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// One matching device: a display label and its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceMatch {
    pub name: String,
    pub value: String,
}

/// A batch of matches, plus a token to continue the scan from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceSearch {
    pub results: Vec<DeviceMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_token: Option<String>,
}

fn string_field<'a>(device: &'a Value, key: &str) -> Option<&'a str> {
    device
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// `hostname || nickname || id`, plus ` — group_name` when present.
pub fn device_label(device: &Value, id: &str) -> String {
    let base = string_field(device, "hostname")
        .or_else(|| string_field(device, "nickname"))
        .unwrap_or(id);
    match string_field(device, "group_name") {
        Some(group) => format!("{base} — {group}"),
        None => base.to_owned(),
    }
}

/// Match a device against a lowercased needle.
fn match_device(device: &Value, needle: &str) -> Option<DeviceMatch> {
    let id = record_cursor(device)?;
    let hostname = device
        .get("hostname")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();
    hostname.contains(needle).then(|| DeviceMatch {
        name: device_label(device, &id),
        value: id,
    })
}

/// Search devices whose hostname contains `filter`, case-insensitively.
///
/// An empty filter returns nothing without a request. `token` resumes a
/// previous scan; the returned token is set only while full pages keep
/// coming back.
pub async fn search_devices_by_hostname(
    client: &LevelClient,
    filter: &str,
    token: Option<&str>,
) -> Result<DeviceSearch, Error> {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(DeviceSearch::default());
    }

    let page_size = i64::try_from(DEFAULT_PAGE_SIZE).unwrap_or(i64::MAX);
    let mut results = Vec::new();
    let mut cursor = token.map(str::to_owned).filter(|t| !t.is_empty());
    let mut has_more = true;

    while results.len() < MAX_SEARCH_RESULTS && has_more {
        let mut query = Query::new();
        query.insert(LIMIT, page_size);
        if let Some(ref c) = cursor {
            query.insert(STARTING_AFTER, c.as_str());
        }

        let items = client.list_page(Collection::Devices, &query, None).await?;
        if items.is_empty() {
            has_more = false;
            break;
        }

        results.extend(items.iter().filter_map(|device| match_device(device, &needle)));

        cursor = items.last().and_then(record_cursor);
        has_more = items.len() == DEFAULT_PAGE_SIZE && cursor.is_some();
        debug!(received = items.len(), matched = results.len(), "scanned device page");
    }

    results.truncate(MAX_SEARCH_RESULTS);
    Ok(DeviceSearch {
        results,
        pagination_token: if has_more { cursor } else { None },
    })
}
