//! Opsdesk Core Engine
//!
//! Client-side message stream reconciliation for the Opsdesk operator
//! console. One conversation thread is kept consistent while three
//! independent sources feed it:
//!
//! - a short-interval poll re-fetching the newest page (live window)
//! - on-demand backward pagination loading older history
//! - optimistic local echoes of messages the operator just sent
//!
//! The engine owns ordering, deduplication, scroll-position stability,
//! and the coarse connectivity signal. Rendering, authentication, and
//! the backing services are external collaborators behind traits.
//!
//! # Example
//!
//! ```no_run
//! use opsdesk_core::*;
//! use std::sync::Arc;
//!
//! # async fn run(store: Arc<dyn MessageStore>, directory: Arc<dyn ParticipantDirectory>,
//! #              tracker: Arc<dyn ReadTracker>) -> Result<()> {
//! let settings = Arc::new(InMemorySettings::new());
//! let session = ThreadSession::new(
//!     ThreadScope::support(),
//!     EngineConfig::default(),
//!     store,
//!     directory,
//!     tracker,
//!     settings,
//! )?;
//! session.activate(Uuid::new_v4()).await;
//! let transcript = session.transcript();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export commonly used types
pub use uuid::Uuid;

// Core modules
pub mod config;
pub mod echo;
pub mod error;
pub mod live_poll;
pub mod logging;
pub mod merge;
pub mod notify;
pub mod pagination;
pub mod participants;
pub mod refresh;
pub mod scroll;
pub mod session;
pub mod store;
pub mod testing;
pub mod types;
pub mod window;

// Re-export main types
pub use config::{
    get_env_bool, get_env_f64, get_env_or, get_env_u64, get_required_env, load_env,
    load_env_from_path, EngineConfig,
};
pub use echo::{EchoController, SendOutcome};
pub use error::{OpsdeskError, Result};
pub use live_poll::LivePollController;
pub use logging::init_logging;
pub use merge::merge_transcript;
pub use notify::ReadTrackingNotifier;
pub use pagination::PaginationController;
pub use participants::{ParticipantPoller, RosterState};
pub use refresh::LiveRefresh;
pub use scroll::{near_top, preserve_on_prepend, ScrollAnchor};
pub use session::{SessionEvent, ThreadScope, ThreadSession};
pub use store::{MessageStore, ParticipantDirectory, ReadTracker};
pub use types::*;
pub use window::{MessageWindow, ThreadPhase};

#[cfg(test)]
mod tests;
