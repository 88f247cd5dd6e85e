//! Backward pagination controller
//!
//! Grows `older_messages` one page at a time, guarded against
//! concurrent invocation and unnecessary calls. Only an explicit empty
//! page closes pagination; transient failures leave every field
//! unchanged so the next trigger retries silently.

use crate::scroll::{preserve_on_prepend, ScrollAnchor};
use crate::store::MessageStore;
use crate::types::UUID;
use crate::window::MessageWindow;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Loads older history on demand
pub struct PaginationController {
    store: Arc<dyn MessageStore>,
    window: Arc<RwLock<MessageWindow>>,
}

impl PaginationController {
    /// Create a controller over a shared window
    pub fn new(store: Arc<dyn MessageStore>, window: Arc<RwLock<MessageWindow>>) -> Self {
        Self { store, window }
    }

    /// Fetch the next backward page, if one may be fetched
    ///
    /// No-op while a fetch is in flight or once history is exhausted; a
    /// second trigger while one is pending is dropped, not queued. The
    /// scroll anchor is read before the prepend and adjusted right
    /// after it, in the same task turn. Returns whether a page was
    /// prepended.
    pub async fn trigger_backward_load(&self, anchor: &mut dyn ScrollAnchor) -> bool {
        // Check-and-set the guard under one lock so overlapping
        // triggers cannot both pass.
        let (conversation, next_page) = {
            let mut window = self.window.write().unwrap();
            let Some(conversation) = window.conversation else {
                return false;
            };
            if window.is_fetching_history || !window.has_more_history {
                return false;
            }
            window.is_fetching_history = true;
            (conversation, window.backward_cursor + 1)
        };

        let height_before = anchor.content_height();
        let fetched = self.store.fetch_page(conversation, next_page).await;

        let mut window = self.window.write().unwrap();
        if !window.is_active_for(conversation) {
            // The window was reset while we were in flight; it no
            // longer carries our guard, so there is nothing to release.
            debug!(%conversation, page = next_page, "dropping stale backward page");
            return false;
        }
        window.is_fetching_history = false;

        match fetched {
            Ok(page) if page.is_empty() => {
                debug!(%conversation, page = next_page, "history exhausted");
                window.has_more_history = false;
                false
            }
            Ok(page) => {
                window.prepend_older(conversation, page);
                window.backward_cursor = next_page;
                drop(window);
                preserve_on_prepend(anchor, height_before);
                true
            }
            Err(err) => {
                // State untouched; the next trigger is the retry.
                warn!(%conversation, page = next_page, error = %err, "backward fetch failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_message, ScriptedStore, TestScrollAnchor};
    use std::time::Duration;
    use uuid::Uuid;

    fn setup(
        conversation: Uuid,
    ) -> (Arc<ScriptedStore>, Arc<RwLock<MessageWindow>>, Arc<PaginationController>) {
        let store = Arc::new(ScriptedStore::new());
        let window = Arc::new(RwLock::new(MessageWindow::new()));
        window.write().unwrap().activate(conversation);
        let controller = Arc::new(PaginationController::new(
            Arc::clone(&store) as Arc<dyn MessageStore>,
            Arc::clone(&window),
        ));
        (store, window, controller)
    }

    #[tokio::test]
    async fn test_successful_load_prepends_and_advances_cursor() {
        let conversation = Uuid::new_v4();
        let (store, window, controller) = setup(conversation);
        store.put_page(2, vec![test_message(conversation, "old-1", 50)]);
        store.put_page(3, vec![test_message(conversation, "old-0", 10)]);
        let mut anchor = TestScrollAnchor::with_rows(10);

        assert!(controller.trigger_backward_load(&mut anchor).await);
        assert!(controller.trigger_backward_load(&mut anchor).await);

        let w = window.read().unwrap();
        assert_eq!(w.backward_cursor, 3);
        assert!(w.has_more_history);
        assert!(!w.is_fetching_history);
        // Page 3 content sits in front of page 2 content
        let ids: Vec<_> = w.older_messages.iter().map(|m| m.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("old-0"), Some("old-1")]);
    }

    #[tokio::test]
    async fn test_empty_page_terminates_pagination() {
        // P4: an empty page closes history and later triggers make no calls
        let conversation = Uuid::new_v4();
        let (store, window, controller) = setup(conversation);
        let mut anchor = TestScrollAnchor::with_rows(10);

        assert!(!controller.trigger_backward_load(&mut anchor).await);
        assert!(!window.read().unwrap().has_more_history);
        assert_eq!(store.fetches_of_page(2), 1);

        assert!(!controller.trigger_backward_load(&mut anchor).await);
        assert!(!controller.trigger_backward_load(&mut anchor).await);
        assert_eq!(store.fetch_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_triggers_issue_one_fetch() {
        // P5: a second trigger while one is in flight is dropped
        let conversation = Uuid::new_v4();
        let (store, _window, controller) = setup(conversation);
        store.put_page(2, vec![test_message(conversation, "old-1", 50)]);
        store.set_fetch_delay(Duration::from_millis(40));

        let first = Arc::clone(&controller);
        let second = Arc::clone(&controller);
        let (a, b) = tokio::join!(
            async move {
                let mut anchor = TestScrollAnchor::with_rows(10);
                first.trigger_backward_load(&mut anchor).await
            },
            async move {
                // Land while the first fetch is still sleeping
                tokio::time::sleep(Duration::from_millis(5)).await;
                let mut anchor = TestScrollAnchor::with_rows(10);
                second.trigger_backward_load(&mut anchor).await
            }
        );

        assert_eq!(store.fetches_of_page(2), 1);
        assert!(a ^ b, "exactly one trigger may win");
    }

    #[tokio::test]
    async fn test_transient_failure_leaves_state_for_retry() {
        let conversation = Uuid::new_v4();
        let (store, window, controller) = setup(conversation);
        store.put_page(2, vec![test_message(conversation, "old-1", 50)]);
        store.set_fail_fetches(true);
        let mut anchor = TestScrollAnchor::with_rows(10);

        assert!(!controller.trigger_backward_load(&mut anchor).await);
        {
            let w = window.read().unwrap();
            // Failure must not close pagination or leak the guard
            assert!(w.has_more_history);
            assert!(!w.is_fetching_history);
            assert_eq!(w.backward_cursor, 1);
            assert!(w.older_messages.is_empty());
        }

        store.set_fail_fetches(false);
        assert!(controller.trigger_backward_load(&mut anchor).await);
        assert_eq!(window.read().unwrap().backward_cursor, 2);
    }

    /// Anchor whose height tracks the window contents, like a thread
    /// view that re-renders synchronously with the state change
    struct WindowBackedAnchor {
        window: Arc<RwLock<MessageWindow>>,
        offset: f64,
    }

    impl crate::scroll::ScrollAnchor for WindowBackedAnchor {
        fn content_height(&self) -> f64 {
            self.window.read().unwrap().transcript().len() as f64 * 20.0
        }

        fn scroll_offset(&self) -> f64 {
            self.offset
        }

        fn set_scroll_offset(&mut self, offset: f64) {
            self.offset = offset;
        }
    }

    #[tokio::test]
    async fn test_scroll_anchor_preserved_across_prepend() {
        let conversation = Uuid::new_v4();
        let (store, window, controller) = setup(conversation);
        window
            .write()
            .unwrap()
            .apply_live_snapshot(conversation, vec![test_message(conversation, "1", 100)]);
        store.put_page(
            2,
            vec![
                test_message(conversation, "old-1", 40),
                test_message(conversation, "old-2", 50),
            ],
        );

        let mut anchor = WindowBackedAnchor {
            window: Arc::clone(&window),
            offset: 5.0,
        };

        assert!(controller.trigger_backward_load(&mut anchor).await);
        // Two rows of 20.0 were prepended above the viewport; the
        // offset grew by exactly that height, so the anchor point
        // stayed put visually.
        assert_eq!(anchor.offset, 45.0);
    }

    #[tokio::test]
    async fn test_stale_result_discarded_after_switch() {
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();
        let (store, window, controller) = setup(old);
        store.put_page(2, vec![test_message(old, "old-1", 50)]);
        store.set_fetch_delay(Duration::from_millis(30));

        let racing = Arc::clone(&controller);
        let handle = tokio::spawn(async move {
            let mut anchor = TestScrollAnchor::with_rows(10);
            racing.trigger_backward_load(&mut anchor).await
        });

        tokio::time::sleep(Duration::from_millis(5)).await;
        window.write().unwrap().activate(new);

        assert!(!handle.await.unwrap());
        let w = window.read().unwrap();
        assert!(w.older_messages.is_empty());
        assert_eq!(w.backward_cursor, 1);
        assert!(!w.is_fetching_history);
    }
}
