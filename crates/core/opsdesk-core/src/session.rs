//! Thread session
//!
//! One parameterized session drives both the internal and the support
//! thread views: the conversation scope picks the participant access
//! policy, everything else is shared. The session owns the message
//! window, spawns and cancels the two refresh loops, and surfaces
//! state changes to the UI layer as broadcast events.

use crate::config::EngineConfig;
use crate::echo::{EchoController, SendOutcome};
use crate::live_poll::LivePollController;
use crate::notify::ReadTrackingNotifier;
use crate::pagination::PaginationController;
use crate::participants::{ParticipantPoller, RosterState};
use crate::refresh::LiveRefresh;
use crate::scroll::{near_top, ScrollAnchor};
use crate::store::{MessageStore, ParticipantDirectory, ReadTracker};
use crate::types::{
    ConversationScope, Message, MessageBody, OutboundDraft, Participant,
    ParticipantAccessPolicy, SenderRef, Service, ServiceHealth, SettingsStore, UUID,
};
use crate::window::{MessageWindow, ThreadPhase};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Scope configuration for a thread surface
#[derive(Debug, Clone, Copy)]
pub struct ThreadScope {
    /// Conversation scope
    pub scope: ConversationScope,
    /// Participant access policy applied to the roster
    pub access: ParticipantAccessPolicy,
}

impl ThreadScope {
    /// Operator-to-operator threads: accounts only
    pub fn internal() -> Self {
        Self {
            scope: ConversationScope::Internal,
            access: ParticipantAccessPolicy::for_scope(ConversationScope::Internal),
        }
    }

    /// Support threads: external participants included
    pub fn support() -> Self {
        Self {
            scope: ConversationScope::Support,
            access: ParticipantAccessPolicy::for_scope(ConversationScope::Support),
        }
    }
}

/// State-change notifications for the UI layer
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The merged transcript changed size
    TranscriptChanged {
        /// New transcript length
        length: usize,
    },
    /// The connectivity signal flipped
    ConnectivityChanged {
        /// New connectivity state
        connected: bool,
    },
    /// A send was rejected by the store; the echo stays visible
    SendFailed {
        /// Human-readable failure reason
        reason: String,
    },
}

/// Internals shared with the spawned refresh loops
struct SessionShared {
    config: EngineConfig,
    window: Arc<RwLock<MessageWindow>>,
    roster: Arc<RwLock<RosterState>>,
    poll: LivePollController,
    pagination: PaginationController,
    echo: EchoController,
    participants: ParticipantPoller,
    notifier: ReadTrackingNotifier,
    settings: Arc<dyn SettingsStore>,
    events: broadcast::Sender<SessionEvent>,
    last_connected: Mutex<Option<bool>>,
}

impl SessionShared {
    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    /// Re-derive observable state after any window mutation
    fn after_mutation(&self, conversation: UUID) {
        let (length, connected, active) = {
            let window = self.window.read().unwrap();
            (
                window.transcript().len(),
                window.connected,
                window.is_active_for(conversation),
            )
        };
        if !active {
            return;
        }
        if self.notifier.observe(conversation, length) {
            self.emit(SessionEvent::TranscriptChanged { length });
        }
        let mut last = self.last_connected.lock().unwrap();
        if *last != Some(connected) {
            *last = Some(connected);
            self.emit(SessionEvent::ConnectivityChanged { connected });
        }
    }

    async fn pump_live(&self, conversation: UUID) {
        self.poll.poll_once(conversation).await;
        self.after_mutation(conversation);
    }

    async fn pump_participants(&self, conversation: UUID) {
        self.participants.poll_once(conversation).await;
    }
}

/// Reconciliation engine for one active conversation thread
pub struct ThreadSession {
    scope: ThreadScope,
    shared: Arc<SessionShared>,
    refreshers: Mutex<Vec<LiveRefresh>>,
}

impl ThreadSession {
    /// Build a session over the three external services
    ///
    /// The settings store is loaded here, once, per its lifecycle.
    pub fn new(
        scope: ThreadScope,
        config: EngineConfig,
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn ParticipantDirectory>,
        tracker: Arc<dyn ReadTracker>,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Self> {
        settings.load()?;
        let window = Arc::new(RwLock::new(MessageWindow::new()));
        let roster = Arc::new(RwLock::new(RosterState::default()));
        let (events, _) = broadcast::channel(config.event_buffer);

        let shared = SessionShared {
            poll: LivePollController::new(Arc::clone(&store), Arc::clone(&window)),
            pagination: PaginationController::new(Arc::clone(&store), Arc::clone(&window)),
            echo: EchoController::new(store, Arc::clone(&window)),
            participants: ParticipantPoller::new(directory, Arc::clone(&roster), scope.access),
            notifier: ReadTrackingNotifier::new(tracker),
            window,
            roster,
            config,
            settings,
            events,
            last_connected: Mutex::new(None),
        };

        Ok(Self {
            scope,
            shared: Arc::new(shared),
            refreshers: Mutex::new(Vec::new()),
        })
    }

    /// Subscribe to session events
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// The scope this session was built for
    pub fn scope(&self) -> ThreadScope {
        self.scope
    }

    /// Make a conversation the active one
    ///
    /// Resets every controller, persists the choice, and starts the two
    /// refresh loops. The live loop's first tick fires immediately, so
    /// the initial transcript appears without a full interval's delay.
    pub async fn activate(&self, conversation: UUID) {
        self.cancel_refreshers();
        self.shared.window.write().unwrap().activate(conversation);
        self.shared.roster.write().unwrap().activate(conversation);
        self.shared.notifier.reset();
        *self.shared.last_connected.lock().unwrap() = None;

        if let Err(err) = self
            .shared
            .settings
            .set("lastActiveConversation", conversation.to_string().into())
        {
            warn!(%conversation, error = %err, "failed to persist active conversation");
        }

        // New baseline: the switch itself clears the unread counter
        self.shared.after_mutation(conversation);

        let live = {
            let shared = Arc::clone(&self.shared);
            LiveRefresh::start(self.shared.config.poll_interval, move || {
                let shared = Arc::clone(&shared);
                async move { shared.pump_live(conversation).await }
            })
        };
        let directory = {
            let shared = Arc::clone(&self.shared);
            LiveRefresh::start(self.shared.config.participant_poll_interval, move || {
                let shared = Arc::clone(&shared);
                async move { shared.pump_participants(conversation).await }
            })
        };
        *self.refreshers.lock().unwrap() = vec![live, directory];

        info!(%conversation, scope = ?self.scope.scope, "thread session activated");
    }

    /// Deactivate the current conversation, if any
    ///
    /// Cancels both refresh loops unconditionally, the one mandatory
    /// cancellation point. In-flight store calls are not cancelled;
    /// their stale results are discarded on arrival by the identity
    /// guard.
    pub fn deactivate(&self) {
        self.cancel_refreshers();
        self.shared.window.write().unwrap().deactivate();
        self.shared.roster.write().unwrap().deactivate();
        self.shared.notifier.reset();
        *self.shared.last_connected.lock().unwrap() = None;
        debug!("thread session deactivated");
    }

    fn cancel_refreshers(&self) {
        for refresh in self.refreshers.lock().unwrap().drain(..) {
            refresh.stop();
        }
    }

    /// Send a message into the active conversation
    ///
    /// Returns the provisional echo now visible in the transcript, or
    /// `None` when no conversation is active. Failures surface as a
    /// connectivity flip plus a [`SessionEvent::SendFailed`]; they are
    /// never returned as errors.
    pub async fn send(&self, sender: SenderRef, body: MessageBody) -> Option<Message> {
        let conversation = self.shared.window.read().unwrap().conversation?;
        let draft = OutboundDraft {
            conversation_id: conversation,
            sender,
            body,
        };

        let outcome = self.shared.echo.send(draft).await;
        let provisional = match outcome {
            SendOutcome::Delivered { provisional, .. } => Some(provisional),
            SendOutcome::Failed { provisional, error } => {
                self.shared.emit(SessionEvent::SendFailed {
                    reason: error.to_string(),
                });
                Some(provisional)
            }
            SendOutcome::Inactive => None,
        };
        self.shared.after_mutation(conversation);
        provisional
    }

    /// Load older history when the viewport is near the top
    ///
    /// The near-top threshold is the trigger policy; the pagination
    /// controller's own guard handles in-flight and exhausted states.
    pub async fn maybe_load_older(&self, anchor: &mut dyn ScrollAnchor) -> bool {
        let Some(conversation) = self.shared.window.read().unwrap().conversation else {
            return false;
        };
        if !near_top(anchor, self.shared.config.near_top_threshold) {
            return false;
        }
        let loaded = self.shared.pagination.trigger_backward_load(anchor).await;
        if loaded {
            self.shared.after_mutation(conversation);
        }
        loaded
    }

    /// The merged transcript for the active conversation
    pub fn transcript(&self) -> Vec<Message> {
        self.shared.window.read().unwrap().transcript()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> ThreadPhase {
        self.shared.window.read().unwrap().phase
    }

    /// Current connectivity signal
    pub fn connected(&self) -> bool {
        self.shared.window.read().unwrap().connected
    }

    /// The active conversation, if any
    pub fn active_conversation(&self) -> Option<UUID> {
        self.shared.window.read().unwrap().conversation
    }

    /// Whether more history can still be fetched backward
    pub fn has_more_history(&self) -> bool {
        self.shared.window.read().unwrap().has_more_history
    }

    /// Policy-filtered participant roster
    pub fn roster(&self) -> Vec<Participant> {
        self.shared.roster.read().unwrap().participants.clone()
    }
}

impl Drop for ThreadSession {
    fn drop(&mut self) {
        // LiveRefresh aborts on drop as well; this keeps teardown
        // explicit when the session goes away without deactivate()
        self.cancel_refreshers();
    }
}

#[async_trait]
impl Service for ThreadSession {
    fn service_type(&self) -> &str {
        "thread-session"
    }

    async fn start(&mut self) -> Result<()> {
        // Resume where the operator left off, when the settings store
        // remembers a conversation
        let last = self
            .shared
            .settings
            .get_string("lastActiveConversation")
            .and_then(|s| s.parse::<UUID>().ok());
        if let Some(conversation) = last {
            self.activate(conversation).await;
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.deactivate();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.phase() != ThreadPhase::Uninitialized
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(match (self.phase(), self.connected()) {
            (ThreadPhase::Uninitialized, _) => ServiceHealth::Healthy,
            (_, true) => ServiceHealth::Healthy,
            (_, false) => ServiceHealth::Degraded,
        })
    }
}
