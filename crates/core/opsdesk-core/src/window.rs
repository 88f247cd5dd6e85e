//! Per-conversation message window
//!
//! One `MessageWindow` exists per active conversation. It owns the
//! three message sources the merge engine reconciles, the backward
//! pagination cursor, and the connectivity flag. Nothing in it survives
//! a conversation switch.

use crate::merge::merge_transcript;
use crate::types::{Message, UUID};

/// Lifecycle phase of a thread window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadPhase {
    /// No conversation active
    Uninitialized,
    /// Conversation activated, first page-1 fetch not yet confirmed
    Activating,
    /// First page-1 fetch succeeded; polling and pagination proceed
    Live,
}

/// Mutable reconciliation state for the active conversation
///
/// The live poll writes `live_messages`, backward pagination writes
/// `older_messages`, the echo controller writes `local_echoes`. Three
/// disjoint slices, so completions may interleave in any order without
/// corrupting each other.
#[derive(Debug)]
pub struct MessageWindow {
    /// Identity guard: the conversation this window belongs to
    pub conversation: Option<UUID>,
    /// Lifecycle phase
    pub phase: ThreadPhase,
    /// Latest page-1 snapshot as last returned by the poll
    pub live_messages: Vec<Message>,
    /// Accumulated backward pages beyond page 1, oldest first
    pub older_messages: Vec<Message>,
    /// Locally composed messages awaiting store confirmation
    pub local_echoes: Vec<Message>,
    /// Backward page counter; 1 means "page 1 covered by the live window"
    pub backward_cursor: u32,
    /// False once a backward fetch returned an empty page
    pub has_more_history: bool,
    /// True only while a backward fetch is in flight
    pub is_fetching_history: bool,
    /// Coarse liveness signal derived from poll/send outcomes
    pub connected: bool,
}

impl Default for MessageWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageWindow {
    /// Create an empty, inactive window
    pub fn new() -> Self {
        Self {
            conversation: None,
            phase: ThreadPhase::Uninitialized,
            live_messages: Vec::new(),
            older_messages: Vec::new(),
            local_echoes: Vec::new(),
            backward_cursor: 1,
            has_more_history: true,
            is_fetching_history: false,
            connected: false,
        }
    }

    /// Reset every field and bind the window to a conversation
    ///
    /// Runs on every activation; no state survives a switch.
    pub fn activate(&mut self, conversation: UUID) {
        *self = Self::new();
        self.conversation = Some(conversation);
        self.phase = ThreadPhase::Activating;
    }

    /// Unbind and reset; the only terminal transition
    pub fn deactivate(&mut self) {
        *self = Self::new();
    }

    /// Whether the window is still bound to the given conversation
    ///
    /// Every result of an in-flight store call is checked through this
    /// before being applied; stale results are discarded.
    pub fn is_active_for(&self, conversation: UUID) -> bool {
        self.conversation == Some(conversation)
    }

    /// Replace the live window with a fresh page-1 snapshot
    ///
    /// The previous snapshot is discarded in full, never merged
    /// incrementally. Echoes whose id appears in the snapshot are now
    /// store-confirmed and dropped. Returns false for stale results.
    pub fn apply_live_snapshot(&mut self, conversation: UUID, page: Vec<Message>) -> bool {
        if !self.is_active_for(conversation) {
            return false;
        }
        self.local_echoes.retain(|echo| match echo.id.as_deref() {
            Some(id) => !page.iter().any(|m| m.id.as_deref() == Some(id)),
            None => true,
        });
        self.live_messages = page;
        self.connected = true;
        if self.phase == ThreadPhase::Activating {
            self.phase = ThreadPhase::Live;
        }
        true
    }

    /// Flip the connectivity signal down
    ///
    /// Failure is immediate; recovery only comes from the next
    /// successful poll tick.
    pub fn mark_disconnected(&mut self) {
        self.connected = false;
    }

    /// Prepend a backward page of older history
    ///
    /// By pagination contract the page is older than everything already
    /// present. Returns false for stale results.
    pub fn prepend_older(&mut self, conversation: UUID, page: Vec<Message>) -> bool {
        if !self.is_active_for(conversation) {
            return false;
        }
        self.older_messages.splice(0..0, page);
        true
    }

    /// Append a local echo ahead of store confirmation
    pub fn push_echo(&mut self, echo: Message) {
        self.local_echoes.push(echo);
    }

    /// The merged, deduplicated, chronologically sorted transcript
    pub fn transcript(&self) -> Vec<Message> {
        merge_transcript(&self.older_messages, &self.live_messages, &self.local_echoes)
    }
}
