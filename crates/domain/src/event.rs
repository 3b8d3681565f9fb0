//! Typed notifications of device store transitions.
//!
//! The store produces [`DeviceEvent`]s on flush; the publisher wraps each in
//! an [`Event`] envelope before putting it on the bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::EventId;

/// A device transition detected between two store flushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DeviceEvent {
    DeviceAdded {
        identifier: String,
        state: Value,
    },
    DeviceChanged {
        identifier: String,
        previous: Value,
        state: Value,
    },
    DeviceRemoved {
        identifier: String,
        previous: Value,
    },
}

impl DeviceEvent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DeviceAdded { .. } => "device-added",
            Self::DeviceChanged { .. } => "device-changed",
            Self::DeviceRemoved { .. } => "device-removed",
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::DeviceAdded { identifier, .. }
            | Self::DeviceChanged { identifier, .. }
            | Self::DeviceRemoved { identifier, .. } => identifier,
        }
    }

    /// Bus topic: `<kind>.<identifier>`.
    #[must_use]
    pub fn topic(&self) -> String {
        format!("{}.{}", self.kind(), self.identifier())
    }
}

/// Envelope carried on the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub topic: String,
    pub payload: DeviceEvent,
}

impl Event {
    /// Wrap a device event, stamping it with a fresh id and the current time.
    #[must_use]
    pub fn new(payload: DeviceEvent) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            topic: payload.topic(),
            payload,
        }
    }
}

impl From<DeviceEvent> for Event {
    fn from(payload: DeviceEvent) -> Self {
        Self::new(payload)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn should_tag_payload_with_kebab_case_kind() {
        let event = DeviceEvent::DeviceChanged {
            identifier: "lamp".to_string(),
            previous: json!({ "power": false }),
            state: json!({ "power": true }),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "kind": "device-changed",
                "identifier": "lamp",
                "previous": { "power": false },
                "state": { "power": true }
            })
        );
    }

    #[test]
    fn should_derive_topic_from_kind_and_identifier() {
        let event = DeviceEvent::DeviceRemoved {
            identifier: "plug-1".to_string(),
            previous: Value::Null,
        };
        assert_eq!(event.topic(), "device-removed.plug-1");
    }

    #[test]
    fn should_stamp_envelope_with_topic_and_unique_id() {
        let payload = DeviceEvent::DeviceAdded {
            identifier: "lamp".to_string(),
            state: json!({}),
        };
        let first = Event::new(payload.clone());
        let second = Event::from(payload);
        assert_eq!(first.topic, "device-added.lamp");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn should_roundtrip_envelope_through_serde_json() {
        let event = Event::new(DeviceEvent::DeviceAdded {
            identifier: "lamp".to_string(),
            state: json!({ "power": null }),
        });
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
