// Response envelope unwrapping.
//
// Level wraps collections inconsistently across endpoints and versions:
// sometimes a bare array, sometimes `{"devices": [...]}`, `{"data": [...]}`,
// or a single entity object. `as_array` normalizes all of them.

use serde_json::Value;

/// Envelope keys probed when no explicit property matches, in order.
pub const FALLBACK_KEYS: [&str; 8] = [
    "device", "devices", "group", "groups", "alert", "alerts", "data", "items",
];

/// Extract the record list from a response body.
///
/// Priority: bare array, then `explicit_property` (if it holds an array),
/// then the first array under [`FALLBACK_KEYS`], then the object itself as
/// a single record. Null and primitives yield nothing.
pub fn as_array(response: &Value, explicit_property: Option<&str>) -> Vec<Value> {
    match response {
        Value::Array(items) => items.clone(),
        Value::Object(container) => {
            let explicit = explicit_property.filter(|p| !p.is_empty());
            explicit
                .into_iter()
                .chain(FALLBACK_KEYS)
                .find_map(|key| container.get(key).and_then(Value::as_array))
                .map_or_else(|| vec![response.clone()], Clone::clone)
        }
        _ => Vec::new(),
    }
}

/// Owned variant of [`as_array`] that avoids cloning a bare array body.
pub fn into_array(response: Value, explicit_property: Option<&str>) -> Vec<Value> {
    match response {
        Value::Array(items) => items,
        other => as_array(&other, explicit_property),
    }
}
