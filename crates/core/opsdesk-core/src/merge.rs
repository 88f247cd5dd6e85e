//! Dedup/merge engine
//!
//! The one pure function at the heart of the transcript: three message
//! sources in, one sorted deduplicated transcript out. Total over
//! malformed input: it never fails, whatever the store hands back.

use crate::types::Message;
use std::collections::HashSet;

/// Merge the three message sources into a display transcript
///
/// Iterates in the fixed order `older → live → echoes` and keeps the
/// first occurrence of each id, so store-confirmed copies win over
/// local echoes of the same message. Entries without an id cannot be
/// reconciled and are kept as distinct. The result is sorted ascending
/// by creation time (stable, so equal timestamps keep source order);
/// messages without a parseable timestamp sort first.
pub fn merge_transcript(
    older: &[Message],
    live: &[Message],
    echoes: &[Message],
) -> Vec<Message> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut transcript: Vec<Message> =
        Vec::with_capacity(older.len() + live.len() + echoes.len());

    for message in older.iter().chain(live).chain(echoes) {
        match message.id.as_deref() {
            Some(id) => {
                if seen.insert(id) {
                    transcript.push(message.clone());
                }
            }
            // Unreconcilable; keep rather than guess
            None => transcript.push(message.clone()),
        }
    }

    transcript.sort_by_key(Message::sort_key);
    transcript
}
