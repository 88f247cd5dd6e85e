//! Primitive types used throughout the Opsdesk engine

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// UUID type (re-export for convenience)
pub type UUID = Uuid;

/// Generic metadata type
pub type Metadata = HashMap<String, serde_json::Value>;

/// Scope of a conversation thread
///
/// The internal and support consoles share one reconciliation engine;
/// the scope selects the participant access policy and is carried on
/// every session so the two surfaces cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConversationScope {
    /// Operator-to-operator thread
    Internal,
    /// Operator-to-customer support thread
    Support,
}

/// Content kind tag for message bodies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentKind {
    /// Plain text content
    #[default]
    Text,
    /// Image content
    Image,
    /// File/document content
    File,
    /// Unknown/other content
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_wire_format() {
        let json = serde_json::to_string(&ContentKind::Image).unwrap();
        assert_eq!(json, "\"IMAGE\"");

        let kind: ContentKind = serde_json::from_str("\"FILE\"").unwrap();
        assert_eq!(kind, ContentKind::File);
    }

    #[test]
    fn test_content_kind_default_is_text() {
        assert_eq!(ContentKind::default(), ContentKind::Text);
    }
}
