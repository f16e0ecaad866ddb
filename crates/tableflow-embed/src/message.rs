use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Namespace stamped on every importer message.
pub const MESSAGE_SOURCE: &str = "tableflow-importer";

/// Kind of importer event. Unknown kinds are carried, never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Complete,
    Close,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Complete => "complete",
            EventKind::Close => "close",
            EventKind::Other(kind) => kind.as_str(),
        }
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        match value {
            "complete" => EventKind::Complete,
            "close" => EventKind::Close,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        EventKind::from(value.as_str())
    }
}

impl From<EventKind> for String {
    fn from(value: EventKind) -> Self {
        match value {
            EventKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admitted inbound message, reduced to the fields the channel routes on.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub importer_id: String,
    pub id: String,
    pub kind: EventKind,
    /// Opaque payload, forwarded untouched.
    pub data: Option<Value>,
}

impl Envelope {
    /// Admit a raw message addressed to `importer_id`.
    ///
    /// Returns `None` for anything outside the importer namespace, for other
    /// importers, and for messages missing `id` or `type`.
    pub fn admit(message: &Value, importer_id: &str) -> Option<Self> {
        let fields = message.as_object()?;
        if fields.get("source")?.as_str()? != MESSAGE_SOURCE {
            return None;
        }
        if fields.get("importerId")?.as_str()? != importer_id {
            return None;
        }
        let id = fields.get("id")?.as_str()?;
        if id.is_empty() {
            return None;
        }
        let kind = EventKind::from(fields.get("type")?.as_str()?);

        Some(Self {
            importer_id: importer_id.to_string(),
            id: id.to_string(),
            kind,
            data: fields.get("data").cloned(),
        })
    }
}

/// Outbound message posted by the embedded importer to its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImporterMessage<P = Value> {
    pub source: String,
    pub importer_id: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<P>,
}

impl<P> ImporterMessage<P> {
    /// Event with a fresh id.
    pub fn new(importer_id: impl Into<String>, kind: EventKind, data: Option<P>) -> Self {
        Self {
            source: MESSAGE_SOURCE.to_string(),
            importer_id: importer_id.into(),
            id: Uuid::new_v4().to_string(),
            kind,
            data,
        }
    }

    /// The import finished; `data` carries the import result.
    pub fn complete(importer_id: impl Into<String>, data: P) -> Self {
        Self::new(importer_id, EventKind::Complete, Some(data))
    }

    /// The user dismissed the importer.
    pub fn close(importer_id: impl Into<String>) -> Self {
        Self::new(importer_id, EventKind::Close, None)
    }
}

impl<P: Serialize> ImporterMessage<P> {
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn admits_well_formed_message() {
        let message = json!({
            "source": "tableflow-importer",
            "importerId": "imp-42",
            "id": "evt-1",
            "type": "complete",
            "data": {"num_rows": 3},
            "extra": true
        });

        let envelope = Envelope::admit(&message, "imp-42").expect("admitted");
        assert_eq!(envelope.kind, EventKind::Complete);
        assert_eq!(envelope.data, Some(json!({"num_rows": 3})));
    }

    #[test]
    fn rejects_foreign_or_incomplete_messages() {
        let base = json!({
            "source": "tableflow-importer",
            "importerId": "imp-42",
            "id": "evt-1",
            "type": "close"
        });
        assert!(Envelope::admit(&base, "imp-42").is_some());

        for field in ["source", "importerId", "id", "type"] {
            let mut message = base.clone();
            message.as_object_mut().unwrap().remove(field);
            assert!(Envelope::admit(&message, "imp-42").is_none(), "missing {field}");
        }

        let mut empty_id = base.clone();
        empty_id["id"] = json!("");
        assert!(Envelope::admit(&empty_id, "imp-42").is_none());

        assert!(Envelope::admit(&base, "imp-7").is_none());
        assert!(Envelope::admit(&json!("complete"), "imp-42").is_none());
        assert!(Envelope::admit(&Value::Null, "imp-42").is_none());
    }

    #[test]
    fn outbound_message_matches_wire_shape() {
        let message = ImporterMessage::complete("imp-42", json!({"rows": []}));
        let value = message.to_value().expect("serialize");

        assert_eq!(value["source"], "tableflow-importer");
        assert_eq!(value["importerId"], "imp-42");
        assert_eq!(value["type"], "complete");
        assert_eq!(value["data"], json!({"rows": []}));
        assert!(!message.id.is_empty());

        let close = ImporterMessage::<Value>::close("imp-42").to_value().expect("serialize");
        assert!(close.get("data").is_none());
        assert_eq!(close["type"], "close");
    }
}
