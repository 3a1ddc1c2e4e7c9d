// Device identifier parsing.
//
// Users paste either a raw device id or a Level dashboard URL such as
// `https://app.level.io/devices/abc%20123/overview`; both resolve to the id.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static DEVICE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/devices?/([^/?#]+)").expect("device segment pattern is valid")
});

/// Resolve a device id from a raw id or a URL containing `/device(s)/<id>`.
///
/// Returns an empty string for blank input.
pub fn parse_device_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(url) = Url::parse(trimmed) {
        if let Some(candidate) = device_segment_in_path(url.path()) {
            if let Some(decoded) = decode(candidate.trim_end_matches('/')) {
                return decoded;
            }
        }
    }

    match device_segment_in_text(trimmed) {
        Some(segment) => {
            let segment = segment.trim_end_matches('/');
            decode(segment).unwrap_or_else(|| segment.to_owned())
        }
        None => trimmed.to_owned(),
    }
}

/// Undo any existing percent-encoding so the id can be re-encoded exactly
/// once as a path segment.
pub fn normalize_path_id(id: &str) -> String {
    decode(id).unwrap_or_else(|| id.to_owned())
}

fn decode(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}

/// First non-empty segment following a `device` / `devices` segment.
fn device_segment_in_path(path: &str) -> Option<&str> {
    let segments: Vec<&str> = path
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    segments.windows(2).find_map(|pair| match pair {
        [marker, candidate]
            if marker.eq_ignore_ascii_case("device") || marker.eq_ignore_ascii_case("devices") =>
        {
            Some(*candidate)
        }
        _ => None,
    })
}

/// Case-insensitive `/devices?/<segment>` over free text.
fn device_segment_in_text(text: &str) -> Option<&str> {
    DEVICE_SEGMENT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
