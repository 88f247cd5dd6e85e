//! Read-tracking notifier
//!
//! Whenever the merged transcript's length changes (in either
//! direction, including the reset to a new baseline on a conversation
//! switch) the external read-tracking service is told to clear the
//! active conversation's unread counter. Fire-and-forget: failures are
//! logged and never affect the transcript.

use crate::store::ReadTracker;
use crate::types::UUID;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Clears unread counters when the visible transcript changes size
pub struct ReadTrackingNotifier {
    tracker: Arc<dyn ReadTracker>,
    last_len: Mutex<Option<usize>>,
}

impl ReadTrackingNotifier {
    /// Create a notifier over a read-tracking service
    pub fn new(tracker: Arc<dyn ReadTracker>) -> Self {
        Self {
            tracker,
            last_len: Mutex::new(None),
        }
    }

    /// Forget the last observed length
    ///
    /// Called on conversation switch so the new baseline fires too.
    pub fn reset(&self) {
        *self.last_len.lock().unwrap() = None;
    }

    /// Observe the current transcript length for a conversation
    ///
    /// Fires `clear_unread` when the length differs from the last
    /// observation. Returns whether the length changed. Must run inside
    /// a tokio runtime.
    pub fn observe(&self, conversation: UUID, transcript_len: usize) -> bool {
        {
            let mut last = self.last_len.lock().unwrap();
            if *last == Some(transcript_len) {
                return false;
            }
            *last = Some(transcript_len);
        }

        let tracker = Arc::clone(&self.tracker);
        tokio::spawn(async move {
            if let Err(err) = tracker.clear_unread(conversation).await {
                warn!(%conversation, error = %err, "failed to clear unread counter");
            }
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingReadTracker;
    use std::time::Duration;
    use uuid::Uuid;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_fires_on_length_change_only() {
        let tracker = Arc::new(RecordingReadTracker::new());
        let notifier = ReadTrackingNotifier::new(Arc::clone(&tracker) as Arc<dyn ReadTracker>);
        let conversation = Uuid::new_v4();

        assert!(notifier.observe(conversation, 0)); // baseline
        assert!(!notifier.observe(conversation, 0));
        assert!(notifier.observe(conversation, 3));
        assert!(!notifier.observe(conversation, 3));

        settle().await;
        assert_eq!(tracker.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fires_on_shrink_too() {
        let tracker = Arc::new(RecordingReadTracker::new());
        let notifier = ReadTrackingNotifier::new(Arc::clone(&tracker) as Arc<dyn ReadTracker>);
        let conversation = Uuid::new_v4();

        notifier.observe(conversation, 5);
        assert!(notifier.observe(conversation, 2));
        settle().await;
        assert_eq!(tracker.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_rebaselines_on_switch() {
        let tracker = Arc::new(RecordingReadTracker::new());
        let notifier = ReadTrackingNotifier::new(Arc::clone(&tracker) as Arc<dyn ReadTracker>);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        notifier.observe(first, 4);
        notifier.reset();
        // Same length as before, but the switch rebaselined
        assert!(notifier.observe(second, 4));

        settle().await;
        assert_eq!(tracker.calls(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_tracker_failure_is_swallowed() {
        let tracker = Arc::new(RecordingReadTracker::new());
        tracker.set_fail(true);
        let notifier = ReadTrackingNotifier::new(Arc::clone(&tracker) as Arc<dyn ReadTracker>);
        let conversation = Uuid::new_v4();

        assert!(notifier.observe(conversation, 1));
        settle().await;
        // The call happened, the failure stayed contained
        assert_eq!(tracker.calls().len(), 1);
        assert!(notifier.observe(conversation, 2));
    }
}
