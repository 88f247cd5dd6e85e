//! Participant types

use super::{ConversationScope, UUID};
use serde::{Deserialize, Serialize};

/// Kind of conversation participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParticipantKind {
    /// Operator account
    Account,
    /// External participant (customer)
    External,
}

/// A conversation participant as reported by the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Directory identifier
    pub id: UUID,
    /// Display name
    pub display_name: String,
    /// Participant kind
    pub kind: ParticipantKind,
    /// Presence hint, when the directory reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
}

/// Which participants a thread surface may show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantAccessPolicy {
    /// Operator accounts only
    AccountsOnly,
    /// Accounts plus external participants
    IncludeExternal,
}

impl ParticipantAccessPolicy {
    /// Whether the policy admits a participant
    pub fn admits(&self, participant: &Participant) -> bool {
        match self {
            ParticipantAccessPolicy::AccountsOnly => {
                participant.kind == ParticipantKind::Account
            }
            ParticipantAccessPolicy::IncludeExternal => true,
        }
    }

    /// Default policy for a conversation scope
    pub fn for_scope(scope: ConversationScope) -> Self {
        match scope {
            ConversationScope::Internal => ParticipantAccessPolicy::AccountsOnly,
            ConversationScope::Support => ParticipantAccessPolicy::IncludeExternal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn participant(kind: ParticipantKind) -> Participant {
        Participant {
            id: Uuid::new_v4(),
            display_name: "Jo".to_string(),
            kind,
            online: None,
        }
    }

    #[test]
    fn test_accounts_only_rejects_external() {
        let policy = ParticipantAccessPolicy::AccountsOnly;
        assert!(policy.admits(&participant(ParticipantKind::Account)));
        assert!(!policy.admits(&participant(ParticipantKind::External)));
    }

    #[test]
    fn test_scope_default_policies() {
        assert_eq!(
            ParticipantAccessPolicy::for_scope(ConversationScope::Internal),
            ParticipantAccessPolicy::AccountsOnly
        );
        assert_eq!(
            ParticipantAccessPolicy::for_scope(ConversationScope::Support),
            ParticipantAccessPolicy::IncludeExternal
        );
    }
}
