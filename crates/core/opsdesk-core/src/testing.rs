//! Test fixtures shared across the engine's test suites
//!
//! Scripted fakes for the three external services plus a fixed-row
//! scroll anchor. Kept in the library (not behind `cfg(test)`) so
//! downstream crates can drive the engine in their own tests.

use crate::scroll::ScrollAnchor;
use crate::store::{MessageStore, ParticipantDirectory, ReadTracker};
use crate::types::{Message, MessageBody, OutboundDraft, Participant, SenderRef, UUID};
use crate::{OpsdeskError, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// Build a test message with a deterministic id and timestamp
pub fn test_message(conversation: UUID, id: &str, millis: i64) -> Message {
    Message {
        id: Some(id.to_string()),
        conversation_id: conversation,
        created_at: Some(Utc.timestamp_millis_opt(millis).unwrap()),
        sender: SenderRef::Unknown,
        body: MessageBody::text(format!("message {}", id)),
        system: false,
    }
}

/// Build a test draft targeting a conversation
pub fn test_draft(conversation: UUID, text: &str) -> OutboundDraft {
    OutboundDraft {
        conversation_id: conversation,
        sender: SenderRef::Account(Uuid::new_v4()),
        body: MessageBody::text(text),
    }
}

/// Scripted in-memory message store
///
/// Pages are fixed up front; fetch/send failure can be toggled at any
/// point, and every fetch is recorded for call-count assertions. An
/// optional per-fetch delay keeps requests in flight long enough for
/// overlap tests.
#[derive(Default)]
pub struct ScriptedStore {
    pages: RwLock<HashMap<u32, Vec<Message>>>,
    fail_fetches: AtomicBool,
    fail_sends: AtomicBool,
    fetch_delay: RwLock<Option<Duration>>,
    fetch_calls: Mutex<Vec<(UUID, u32)>>,
    send_calls: AtomicUsize,
}

impl ScriptedStore {
    /// Empty store; every page fetch returns an empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the content of one page
    pub fn put_page(&self, page: u32, messages: Vec<Message>) {
        self.pages.write().unwrap().insert(page, messages);
    }

    /// Make subsequent fetches fail (or succeed again)
    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent sends fail (or succeed again)
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Delay every fetch, keeping requests observably in flight
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.write().unwrap() = Some(delay);
    }

    /// All recorded `(conversation, page)` fetch calls
    pub fn fetch_calls(&self) -> Vec<(UUID, u32)> {
        self.fetch_calls.lock().unwrap().clone()
    }

    /// Recorded fetch calls for one page number
    pub fn fetches_of_page(&self, page: u32) -> usize {
        self.fetch_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p)| *p == page)
            .count()
    }

    /// Number of recorded send calls
    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageStore for ScriptedStore {
    async fn fetch_page(&self, conversation_id: UUID, page: u32) -> Result<Vec<Message>> {
        self.fetch_calls.lock().unwrap().push((conversation_id, page));
        let delay = *self.fetch_delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(OpsdeskError::store("scripted fetch failure"));
        }
        Ok(self
            .pages
            .read()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }

    async fn send(&self, draft: OutboundDraft) -> Result<Message> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(OpsdeskError::store("scripted send failure"));
        }
        Ok(Message {
            id: Some(format!("srv-{}", self.send_calls.load(Ordering::SeqCst))),
            conversation_id: draft.conversation_id,
            created_at: Some(Utc::now()),
            sender: draft.sender,
            body: draft.body,
            system: false,
        })
    }
}

/// Scripted participant directory
#[derive(Default)]
pub struct ScriptedDirectory {
    participants: RwLock<Vec<Participant>>,
    fail: AtomicBool,
}

impl ScriptedDirectory {
    /// Directory that reports the given participants
    pub fn with_participants(participants: Vec<Participant>) -> Self {
        Self {
            participants: RwLock::new(participants),
            fail: AtomicBool::new(false),
        }
    }

    /// Make subsequent listings fail (or succeed again)
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ParticipantDirectory for ScriptedDirectory {
    async fn list_participants(
        &self,
        _conversation_id: UUID,
        _query: Option<String>,
    ) -> Result<Vec<Participant>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(OpsdeskError::directory("scripted directory failure"));
        }
        Ok(self.participants.read().unwrap().clone())
    }
}

/// Read tracker that records every `clear_unread` call
#[derive(Default)]
pub struct RecordingReadTracker {
    calls: Mutex<Vec<UUID>>,
    fail: AtomicBool,
}

impl RecordingReadTracker {
    /// Fresh recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent calls fail (failures must stay non-fatal)
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All recorded conversations, in call order
    pub fn calls(&self) -> Vec<UUID> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReadTracker for RecordingReadTracker {
    async fn clear_unread(&self, conversation_id: UUID) -> Result<()> {
        self.calls.lock().unwrap().push(conversation_id);
        if self.fail.load(Ordering::SeqCst) {
            return Err(OpsdeskError::other("scripted read tracker failure"));
        }
        Ok(())
    }
}

/// Fixed-row-height scroll anchor
///
/// Content height is `rows * row_height`, which is how the thread view
/// sizes its container in practice.
pub struct TestScrollAnchor {
    rows: usize,
    row_height: f64,
    offset: f64,
}

impl TestScrollAnchor {
    /// Anchor over `rows` rendered rows
    pub fn with_rows(rows: usize) -> Self {
        Self {
            rows,
            row_height: 20.0,
            offset: 0.0,
        }
    }

    /// Simulate rendering a different number of rows
    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows;
    }

    /// Height of one rendered row
    pub fn row_height(&self) -> f64 {
        self.row_height
    }
}

impl ScrollAnchor for TestScrollAnchor {
    fn content_height(&self) -> f64 {
        self.rows as f64 * self.row_height
    }

    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.offset = offset;
    }
}
