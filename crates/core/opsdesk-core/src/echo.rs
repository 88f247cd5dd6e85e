//! Optimistic echo controller
//!
//! Sends feel instantaneous despite the poll cadence: the composed
//! message lands in the transcript before the store call resolves.
//! Reconciliation is by id only: a provisional echo is dropped when a
//! poll snapshot carries its id, never by content equality. An echo
//! whose store copy arrives under a different id stays visible twice
//! until the window resets. Confirm-by-id is the deliberate contract;
//! the duplicate-risk window is accepted.

use crate::store::MessageStore;
use crate::types::{Message, OutboundDraft, UUID};
use crate::window::MessageWindow;
use crate::OpsdeskError;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Outcome of one optimistic send
#[derive(Debug)]
pub enum SendOutcome {
    /// Store accepted the message; the echo stays until a poll
    /// snapshot carries the confirmed id
    Delivered {
        /// The echo already visible in the transcript
        provisional: Message,
        /// The store-confirmed message
        confirmed: Message,
    },
    /// Store rejected the message; the echo stays visible, connectivity
    /// is flipped down
    Failed {
        /// The echo already visible in the transcript
        provisional: Message,
        /// The store error
        error: OpsdeskError,
    },
    /// The draft's conversation is not the active one; nothing was sent
    Inactive,
}

/// Appends local echoes and pushes drafts to the store
pub struct EchoController {
    store: Arc<dyn MessageStore>,
    window: Arc<RwLock<MessageWindow>>,
}

impl EchoController {
    /// Create a controller over a shared window
    pub fn new(store: Arc<dyn MessageStore>, window: Arc<RwLock<MessageWindow>>) -> Self {
        Self { store, window }
    }

    /// Send a draft, echoing it into the transcript immediately
    ///
    /// The provisional entry is appended before the store call suspends
    /// and is never rolled back, whatever the outcome.
    pub async fn send(&self, draft: OutboundDraft) -> SendOutcome {
        let conversation: UUID = draft.conversation_id;
        let provisional = Message::provisional(&draft);

        {
            let mut window = self.window.write().unwrap();
            if !window.is_active_for(conversation) {
                return SendOutcome::Inactive;
            }
            window.push_echo(provisional.clone());
        }

        match self.store.send(draft).await {
            Ok(confirmed) => {
                debug!(%conversation, id = ?confirmed.id, "send confirmed by store");
                SendOutcome::Delivered {
                    provisional,
                    confirmed,
                }
            }
            Err(error) => {
                warn!(%conversation, error = %error, "send rejected; echo left in place");
                let mut window = self.window.write().unwrap();
                if window.is_active_for(conversation) {
                    window.mark_disconnected();
                }
                SendOutcome::Failed { provisional, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_draft, ScriptedStore};
    use uuid::Uuid;

    fn setup(conversation: Uuid) -> (Arc<ScriptedStore>, Arc<RwLock<MessageWindow>>, EchoController) {
        let store = Arc::new(ScriptedStore::new());
        let window = Arc::new(RwLock::new(MessageWindow::new()));
        window.write().unwrap().activate(conversation);
        let controller = EchoController::new(
            Arc::clone(&store) as Arc<dyn MessageStore>,
            Arc::clone(&window),
        );
        (store, window, controller)
    }

    #[tokio::test]
    async fn test_echo_is_visible_immediately() {
        let conversation = Uuid::new_v4();
        let (_store, window, controller) = setup(conversation);

        let outcome = controller.send(test_draft(conversation, "hello")).await;
        let SendOutcome::Delivered { provisional, confirmed } = outcome else {
            panic!("expected delivery");
        };
        assert!(provisional.is_provisional());
        assert!(!confirmed.is_provisional());

        let w = window.read().unwrap();
        assert_eq!(w.local_echoes.len(), 1);
        assert_eq!(w.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_echo_and_disconnects() {
        // Scenario E: send fails, connected flips false, echo stays visible
        let conversation = Uuid::new_v4();
        let (store, window, controller) = setup(conversation);
        store.set_fail_sends(true);

        let outcome = controller.send(test_draft(conversation, "hello")).await;
        assert!(matches!(outcome, SendOutcome::Failed { .. }));

        let w = window.read().unwrap();
        assert!(!w.connected);
        assert_eq!(w.local_echoes.len(), 1);
        assert!(w.transcript()[0].is_provisional());
    }

    #[tokio::test]
    async fn test_echo_survives_poll_cycles_until_confirmed() {
        let conversation = Uuid::new_v4();
        let (_store, window, controller) = setup(conversation);

        controller.send(test_draft(conversation, "hello")).await;
        let echo_id = window.read().unwrap().local_echoes[0].id.clone().unwrap();

        // Snapshots without the echo id leave it pending
        let mut w = window.write().unwrap();
        w.apply_live_snapshot(conversation, Vec::new());
        assert_eq!(w.local_echoes.len(), 1);

        // A snapshot carrying the id confirms it
        let mut confirmed = crate::testing::test_message(conversation, "x", 100);
        confirmed.id = Some(echo_id);
        w.apply_live_snapshot(conversation, vec![confirmed]);
        assert!(w.local_echoes.is_empty());
    }

    #[tokio::test]
    async fn test_inactive_conversation_sends_nothing() {
        let conversation = Uuid::new_v4();
        let (store, window, controller) = setup(conversation);
        window.write().unwrap().deactivate();

        let outcome = controller.send(test_draft(conversation, "hello")).await;
        assert!(matches!(outcome, SendOutcome::Inactive));
        assert_eq!(store.send_calls(), 0);
    }
}
