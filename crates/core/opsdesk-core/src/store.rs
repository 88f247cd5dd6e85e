//! External service boundaries
//!
//! The engine consumes three black-box services: a paged message store,
//! a read-only participant directory, and a fire-and-forget read
//! tracker. All are unreliable; callers treat every failure as
//! transient.

use crate::types::{Message, OutboundDraft, Participant, UUID};
use crate::Result;
use async_trait::async_trait;

/// Paged read + single-message write access to the message store
///
/// Page 1 is always the most recent messages; increasing page numbers
/// move strictly backward in time. Two calls may return overlapping or
/// reordered content; the merge engine owns reconciliation. An empty
/// page is the sole authoritative "no more history" signal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Fetch one page of a conversation, newest pages first
    async fn fetch_page(&self, conversation_id: UUID, page: u32) -> Result<Vec<Message>>;

    /// Send one message; no partial-failure contract beyond success/error
    async fn send(&self, draft: OutboundDraft) -> Result<Message>;
}

/// Read-only participant directory, polled independently of messages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// List participants of a conversation, optionally filtered
    async fn list_participants(
        &self,
        conversation_id: UUID,
        query: Option<String>,
    ) -> Result<Vec<Participant>>;
}

/// Outbound read-tracking side effect
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadTracker: Send + Sync {
    /// Clear the unread counter for a conversation; best-effort
    async fn clear_unread(&self, conversation_id: UUID) -> Result<()>;
}
