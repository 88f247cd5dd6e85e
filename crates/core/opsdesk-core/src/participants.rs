//! Participant roster
//!
//! The directory is polled independently of the message stream, on its
//! own cadence, into a roster snapshot filtered through the thread's
//! access policy. Directory failures leave the roster unchanged; the
//! roster never affects the transcript.

use crate::store::ParticipantDirectory;
use crate::types::{Participant, ParticipantAccessPolicy, UUID};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Roster snapshot for the active conversation
#[derive(Debug, Default)]
pub struct RosterState {
    /// Identity guard, same discipline as the message window
    pub conversation: Option<UUID>,
    /// Last good directory snapshot, post-policy
    pub participants: Vec<Participant>,
}

impl RosterState {
    /// Bind to a conversation, clearing any previous snapshot
    pub fn activate(&mut self, conversation: UUID) {
        self.conversation = Some(conversation);
        self.participants.clear();
    }

    /// Unbind and clear
    pub fn deactivate(&mut self) {
        self.conversation = None;
        self.participants.clear();
    }
}

/// Polls the directory and maintains the roster
pub struct ParticipantPoller {
    directory: Arc<dyn ParticipantDirectory>,
    roster: Arc<RwLock<RosterState>>,
    policy: ParticipantAccessPolicy,
}

impl ParticipantPoller {
    /// Create a poller applying the given access policy
    pub fn new(
        directory: Arc<dyn ParticipantDirectory>,
        roster: Arc<RwLock<RosterState>>,
        policy: ParticipantAccessPolicy,
    ) -> Self {
        Self {
            directory,
            roster,
            policy,
        }
    }

    /// Run one directory poll for a conversation
    ///
    /// Stale results (conversation switched while in flight) are
    /// dropped. Returns whether the roster was replaced.
    pub async fn poll_once(&self, conversation: UUID) -> bool {
        match self.directory.list_participants(conversation, None).await {
            Ok(participants) => {
                let admitted: Vec<Participant> = participants
                    .into_iter()
                    .filter(|p| self.policy.admits(p))
                    .collect();
                let mut roster = self.roster.write().unwrap();
                if roster.conversation != Some(conversation) {
                    debug!(%conversation, "dropping stale participant snapshot");
                    return false;
                }
                roster.participants = admitted;
                true
            }
            Err(err) => {
                warn!(%conversation, error = %err, "participant poll failed");
                false
            }
        }
    }
}
