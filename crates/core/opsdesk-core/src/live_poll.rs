//! Live poll controller
//!
//! Maintains the illusion of real-time delivery without a persistent
//! connection: page 1 is re-fetched on a short cadence and replaces the
//! live window wholesale. Poll success and failure drive the coarse
//! connectivity signal.

use crate::store::MessageStore;
use crate::types::UUID;
use crate::window::MessageWindow;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Feeds the live window from page-1 snapshots
pub struct LivePollController {
    store: Arc<dyn MessageStore>,
    window: Arc<RwLock<MessageWindow>>,
}

impl LivePollController {
    /// Create a controller over a shared window
    pub fn new(store: Arc<dyn MessageStore>, window: Arc<RwLock<MessageWindow>>) -> Self {
        Self { store, window }
    }

    /// Run one poll tick for a conversation
    ///
    /// On success the previous snapshot is discarded in full and
    /// `connected` flips true; on failure the snapshot is left in place
    /// and `connected` flips false. Results arriving after the
    /// conversation switched are dropped. Returns whether a snapshot
    /// was applied.
    pub async fn poll_once(&self, conversation: UUID) -> bool {
        match self.store.fetch_page(conversation, 1).await {
            Ok(page) => {
                let applied = self
                    .window
                    .write()
                    .unwrap()
                    .apply_live_snapshot(conversation, page);
                if !applied {
                    debug!(%conversation, "dropping stale live snapshot");
                }
                applied
            }
            Err(err) => {
                warn!(%conversation, error = %err, "live poll tick failed");
                let mut window = self.window.write().unwrap();
                if window.is_active_for(conversation) {
                    window.mark_disconnected();
                }
                false
            }
        }
    }
}
