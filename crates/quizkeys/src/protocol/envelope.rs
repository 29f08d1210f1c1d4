// Relay envelope - the only thing frames ever say to each other
//
// Wire shape (JSON, posted through the frame message channel):
//
//   { "marker": true, "type": "KEY_EVENT", "key": "1", "code": "Digit1",
//     "shiftKey": false, "originFrameId": "9f0c...", "relayed": true }
//
// `relayed` is only present on messages a nested frame sends up to the top.
// Anything else arriving on the channel belongs to the page and is rejected
// by `RelayMessage::from_value` before interpretation.

use crate::error::{Error, Result};
use crate::protocol::keys::KeyInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Value of the envelope's `type` field
pub const KEY_EVENT_TYPE: &str = "KEY_EVENT";

/// Identifier a frame stamps on every message it sends
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random v4 UUID in simple (32 hex digit) form
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum MessageType {
    #[serde(rename = "KEY_EVENT")]
    KeyEvent,
}

/// A keystroke forwarded between frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayMessage {
    marker: bool,
    #[serde(rename = "type")]
    kind: MessageType,
    #[serde(flatten)]
    pub input: KeyInput,
    pub origin_frame_id: FrameId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayed: Option<bool>,
}

impl RelayMessage {
    /// Message a frame broadcasts downward to its children
    pub fn broadcast(input: KeyInput, origin: FrameId) -> Self {
        Self {
            marker: true,
            kind: MessageType::KeyEvent,
            input,
            origin_frame_id: origin,
            relayed: None,
        }
    }

    /// Message a nested frame sends up to the top frame
    pub fn to_top(input: KeyInput, origin: FrameId) -> Self {
        Self {
            relayed: Some(true),
            ..Self::broadcast(input, origin)
        }
    }

    pub fn is_relayed(&self) -> bool {
        self.relayed.unwrap_or(false)
    }

    /// Validates and decodes a raw channel payload.
    ///
    /// The marker and type are checked before the full decode so foreign
    /// page traffic is rejected with a precise reason.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(Error::InvalidEnvelope("payload is not an object".to_string()));
        };
        if object.get("marker").and_then(Value::as_bool) != Some(true) {
            return Err(Error::InvalidEnvelope("missing envelope marker".to_string()));
        }
        match object.get("type").and_then(Value::as_str) {
            Some(KEY_EVENT_TYPE) => {}
            Some(other) => {
                return Err(Error::InvalidEnvelope(format!(
                    "unexpected message type '{}'",
                    other
                )));
            }
            None => return Err(Error::InvalidEnvelope("missing message type".to_string())),
        }
        serde_json::from_value(value.clone()).map_err(|e| Error::InvalidEnvelope(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_of_relayed_message() {
        let msg = RelayMessage::to_top(KeyInput::digit(1), FrameId::new("child"));
        let value = msg.to_value().unwrap();
        assert_eq!(
            value,
            json!({
                "marker": true,
                "type": "KEY_EVENT",
                "key": "1",
                "code": "Digit1",
                "shiftKey": false,
                "originFrameId": "child",
                "relayed": true
            })
        );
    }

    #[test]
    fn test_broadcast_omits_relayed_flag() {
        let msg = RelayMessage::broadcast(KeyInput::space(), FrameId::new("top"));
        let value = msg.to_value().unwrap();
        assert!(value.get("relayed").is_none());
        assert!(!RelayMessage::from_value(&value).unwrap().is_relayed());
    }

    #[test]
    fn test_rejects_foreign_payloads() {
        let cases = [
            json!("hello"),
            json!({ "type": "KEY_EVENT", "key": "1", "code": "Digit1", "shiftKey": false, "originFrameId": "x" }),
            json!({ "marker": false, "type": "KEY_EVENT" }),
            json!({ "marker": true, "type": "RESIZE" }),
            json!({ "marker": true }),
            json!({ "marker": true, "type": "KEY_EVENT", "key": 1 }),
        ];
        for payload in cases {
            assert!(
                matches!(RelayMessage::from_value(&payload), Err(Error::InvalidEnvelope(_))),
                "{payload} should be rejected"
            );
        }
    }

    #[test]
    fn test_accepts_extra_fields() {
        let payload = json!({
            "marker": true,
            "type": "KEY_EVENT",
            "key": "5",
            "code": "Digit5",
            "shiftKey": false,
            "originFrameId": "abc",
            "sentAt": 12345
        });
        let msg = RelayMessage::from_value(&payload).unwrap();
        assert_eq!(msg.input, KeyInput::digit(5));
        assert_eq!(msg.origin_frame_id, FrameId::new("abc"));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: std::collections::HashSet<FrameId> =
            (0..64).map(|_| FrameId::generate()).collect();
        assert_eq!(ids.len(), 64);
        for id in &ids {
            assert_eq!(id.as_str().len(), 32);
            assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
