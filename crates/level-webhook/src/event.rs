// ── Webhook events and dispatch ──
//
// A delivery is parsed once into a `WebhookEvent` that keeps the raw body
// next to the parsed document. `dispatch` decides whether it is emitted and
// in which shape.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Event types Level documents for webhook deliveries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AlertActive,
    AlertResolved,
    DeviceCreated,
    DeviceUpdated,
    DeviceDeleted,
    GroupCreated,
    GroupUpdated,
    GroupDeleted,
}

/// The event types a receiver forwards. Empty means every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSelection(BTreeSet<EventType>);

impl EventSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether an event with this `event_type` value is selected.
    /// Types outside [`EventType`] are only selected by an empty selection.
    pub fn allows(&self, event_type: &str) -> bool {
        self.0.is_empty()
            || event_type
                .parse::<EventType>()
                .is_ok_and(|t| self.0.contains(&t))
    }
}

impl FromIterator<EventType> for EventSelection {
    fn from_iter<I: IntoIterator<Item = EventType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Why a delivery body could not become an event.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("webhook body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("webhook body must be a JSON object or array")]
    NotStructured,
}

/// One inbound delivery: the body as received and its parsed document,
/// always an object or an array.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub raw: String,
    pub parsed: Value,
}

impl WebhookEvent {
    pub fn parse(raw_body: &[u8]) -> Result<Self, EventError> {
        match serde_json::from_slice::<Value>(raw_body)? {
            parsed @ (Value::Object(_) | Value::Array(_)) => Ok(Self {
                raw: String::from_utf8_lossy(raw_body).into_owned(),
                parsed,
            }),
            _ => Err(EventError::NotStructured),
        }
    }

    /// The `event_type` field, when it is a non-empty string. Arrays have
    /// none.
    pub fn event_type(&self) -> Option<&str> {
        self.parsed
            .get("event_type")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// What gets forwarded downstream for an accepted event.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// The body exactly as received, as `{"rawBody": "..."}`.
    Raw { raw_body: String },
    /// The parsed event document.
    Event(Value),
}

impl Emission {
    pub fn into_json(self) -> Value {
        match self {
            Self::Raw { raw_body } => json!({ "rawBody": raw_body }),
            Self::Event(parsed) => parsed,
        }
    }
}

/// Outcome of routing one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Emit(Emission),
    /// Filtered out: acknowledged, nothing emitted.
    Suppress,
}

/// Route an event through the selection.
///
/// Events without an `event_type` always pass, as does everything when the
/// selection is empty.
pub fn dispatch(event: WebhookEvent, selection: &EventSelection, emit_raw: bool) -> Dispatch {
    if event.event_type().is_some_and(|t| !selection.allows(t)) {
        return Dispatch::Suppress;
    }

    Dispatch::Emit(if emit_raw {
        Emission::Raw {
            raw_body: event.raw,
        }
    } else {
        Emission::Event(event.parsed)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    fn event(body: &str) -> WebhookEvent {
        WebhookEvent::parse(body.as_bytes()).unwrap()
    }

    fn only(t: EventType) -> EventSelection {
        [t].into_iter().collect()
    }

    #[test]
    fn unselected_event_is_suppressed() {
        let ev = event(r#"{"event_type":"device_created","id":"d1"}"#);
        assert_eq!(
            dispatch(ev, &only(EventType::AlertActive), false),
            Dispatch::Suppress
        );
    }

    #[test]
    fn selected_event_is_emitted_parsed() {
        let ev = event(r#"{"event_type":"alert_active","id":"a1"}"#);
        let Dispatch::Emit(emission) = dispatch(ev, &only(EventType::AlertActive), false) else {
            panic!("expected emission");
        };
        assert_eq!(
            emission.into_json(),
            json!({"event_type": "alert_active", "id": "a1"})
        );
    }

    #[test]
    fn raw_mode_emits_body_as_received() {
        let body = r#"{ "event_type" : "group_deleted" }"#;
        let dispatched = dispatch(event(body), &EventSelection::all(), true);
        assert_eq!(
            dispatched,
            Dispatch::Emit(Emission::Raw {
                raw_body: body.to_owned()
            })
        );
    }

    #[test]
    fn events_without_type_pass_any_selection() {
        for body in [r#"{"id":1}"#, r#"{"event_type":""}"#, r#"{"event_type":7}"#] {
            assert!(matches!(
                dispatch(event(body), &only(EventType::GroupCreated), false),
                Dispatch::Emit(_)
            ));
        }
    }

    #[test]
    fn unknown_types_pass_only_an_empty_selection() {
        let body = r#"{"event_type":"automation_finished"}"#;
        assert!(matches!(
            dispatch(event(body), &EventSelection::all(), false),
            Dispatch::Emit(_)
        ));
        assert_eq!(
            dispatch(event(body), &only(EventType::DeviceUpdated), false),
            Dispatch::Suppress
        );
    }

    #[test]
    fn array_bodies_are_emitted_under_any_selection() {
        let ev = event(r#"[{"event_type":"device_created"},{"id":2}]"#);
        assert_eq!(ev.event_type(), None);
        let Dispatch::Emit(emission) = dispatch(ev, &only(EventType::AlertActive), false) else {
            panic!("expected emission");
        };
        assert_eq!(
            emission.into_json(),
            json!([{"event_type": "device_created"}, {"id": 2}])
        );
    }

    #[test]
    fn invalid_bodies_are_errors() {
        assert!(matches!(
            WebhookEvent::parse(b"not json"),
            Err(EventError::InvalidJson(_))
        ));
        let scalars: [&[u8]; 3] = [b"42", b"\"text\"", b"null"];
        for scalar in scalars {
            assert!(matches!(
                WebhookEvent::parse(scalar),
                Err(EventError::NotStructured)
            ));
        }
    }

    #[test]
    fn event_type_names_match_level() {
        let names: Vec<String> = EventType::iter().map(|t| t.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "alert_active",
                "alert_resolved",
                "device_created",
                "device_updated",
                "device_deleted",
                "group_created",
                "group_updated",
                "group_deleted",
            ]
        );
    }
}
