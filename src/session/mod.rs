//! Session orchestration
//!
//! - [`controller`]: `SessionController` and its builder
//! - [`presenter`]: `Presenter` and `ActionHandler` hooks
//! - [`terminal`]: presenter for command-line use
//!
//! Applications normally own a [`SessionController`] and pass it where it is
//! needed. For code that cannot easily thread it through, one controller may
//! be installed as the process-wide default.

pub mod controller;
pub mod presenter;
pub mod terminal;

use std::sync::{Arc, OnceLock};

pub use controller::{
    InitState, PromptOutcome, SessionBuilder, SessionController, SessionSnapshot,
};
pub use presenter::{ActionHandler, Presenter, PromptRequest, UserAction};
pub use terminal::TerminalPresenter;

static DEFAULT_SESSION: OnceLock<Arc<SessionController>> = OnceLock::new();

/// Install the process-wide default session.
///
/// Only the first call succeeds; later calls hand the rejected session back.
pub fn install_default(session: Arc<SessionController>) -> Result<(), Arc<SessionController>> {
    DEFAULT_SESSION.set(session)
}

pub fn default_session() -> Option<Arc<SessionController>> {
    DEFAULT_SESSION.get().cloned()
}
