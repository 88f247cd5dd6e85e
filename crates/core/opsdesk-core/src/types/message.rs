//! Message types

use super::{ContentKind, UUID};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque reference to the sender of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SenderRef {
    /// An operator account
    Account(UUID),
    /// An external participant (customer handle, phone number, ...)
    External(String),
    /// Sender could not be resolved
    Unknown,
}

impl Default for SenderRef {
    fn default() -> Self {
        SenderRef::Unknown
    }
}

/// Message body: content plus content-kind tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    /// Textual content
    #[serde(default)]
    pub text: String,
    /// Content kind tag
    #[serde(default)]
    pub kind: ContentKind,
}

impl MessageBody {
    /// Plain text body
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: content.into(),
            kind: ContentKind::Text,
        }
    }
}

/// A single conversation message
///
/// Immutable once stored. `id` is assigned by the store and uniquely
/// identifies a message within its conversation regardless of which
/// source (poll, pagination, echo) produced the copy; a missing id is
/// tolerated and never merged with anything. `created_at` is the sole
/// source of chronological ordering; an unparseable wire timestamp is
/// absorbed as `None` and sorts as epoch zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Store-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Owning conversation
    pub conversation_id: UUID,

    /// Creation timestamp
    #[serde(default, deserialize_with = "tolerant_timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    /// Sender reference
    #[serde(default)]
    pub sender: SenderRef,

    /// Body content
    #[serde(default)]
    pub body: MessageBody,

    /// Marks synthetic/system-generated entries
    #[serde(default)]
    pub system: bool,
}

/// Prefix used on client-assigned provisional ids
pub const PROVISIONAL_ID_PREFIX: &str = "tmp-";

impl Message {
    /// Chronological sort key; messages without a timestamp sort earliest
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Whether this message carries a client-assigned provisional id
    pub fn is_provisional(&self) -> bool {
        self.id
            .as_deref()
            .is_some_and(|id| id.starts_with(PROVISIONAL_ID_PREFIX))
    }

    /// Build the provisional local echo for an outbound draft
    ///
    /// The real id is unknown until the store confirms; the echo carries a
    /// `tmp-` id that no store-assigned id will ever collide with.
    pub fn provisional(draft: &OutboundDraft) -> Self {
        Self {
            id: Some(format!("{}{}", PROVISIONAL_ID_PREFIX, Uuid::new_v4())),
            conversation_id: draft.conversation_id,
            created_at: Some(Utc::now()),
            sender: draft.sender.clone(),
            body: draft.body.clone(),
            system: false,
        }
    }
}

/// Outbound message draft, before store confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundDraft {
    /// Target conversation
    pub conversation_id: UUID,
    /// Sender reference
    pub sender: SenderRef,
    /// Body content
    pub body: MessageBody,
}

/// Deserialize a wire timestamp, absorbing malformed values as `None`
///
/// Accepts RFC 3339 strings and integer epoch milliseconds. Anything
/// else (null, garbage strings, wrong types) becomes `None` rather than
/// a deserialization error, so one bad row cannot poison a page.
fn tolerant_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(parse_timestamp_value))
}

fn parse_timestamp_value(value: serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OutboundDraft {
        OutboundDraft {
            conversation_id: Uuid::new_v4(),
            sender: SenderRef::Account(Uuid::new_v4()),
            body: MessageBody::text("hello"),
        }
    }

    #[test]
    fn test_provisional_echo_shape() {
        let d = draft();
        let echo = Message::provisional(&d);

        assert!(echo.is_provisional());
        assert_eq!(echo.conversation_id, d.conversation_id);
        assert_eq!(echo.body.text, "hello");
        assert!(echo.created_at.is_some());
        assert!(!echo.system);
    }

    #[test]
    fn test_sort_key_missing_timestamp_is_epoch() {
        let mut msg = Message::provisional(&draft());
        msg.created_at = None;
        assert_eq!(msg.sort_key(), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_tolerant_timestamp_rfc3339() {
        let json = format!(
            r#"{{"conversationId":"{}","createdAt":"2026-01-05T10:30:00Z"}}"#,
            Uuid::new_v4()
        );
        let msg: Message = serde_json::from_str(&json).unwrap();
        assert!(msg.created_at.is_some());
    }

    #[test]
    fn test_tolerant_timestamp_epoch_millis() {
        let json = format!(
            r#"{{"conversationId":"{}","createdAt":1700000000000}}"#,
            Uuid::new_v4()
        );
        let msg: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg.created_at.unwrap().timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_tolerant_timestamp_garbage_becomes_none() {
        let json = format!(
            r#"{{"conversationId":"{}","createdAt":"not a date"}}"#,
            Uuid::new_v4()
        );
        let msg: Message = serde_json::from_str(&json).unwrap();
        assert!(msg.created_at.is_none());

        let json = format!(
            r#"{{"conversationId":"{}","createdAt":null}}"#,
            Uuid::new_v4()
        );
        let msg: Message = serde_json::from_str(&json).unwrap();
        assert!(msg.created_at.is_none());
    }

    #[test]
    fn test_missing_id_tolerated() {
        let json = format!(r#"{{"conversationId":"{}"}}"#, Uuid::new_v4());
        let msg: Message = serde_json::from_str(&json).unwrap();
        assert!(msg.id.is_none());
        assert!(!msg.is_provisional());
    }
}
