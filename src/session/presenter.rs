//! Presentation and user-action hooks

#[cfg(test)]
use mockall::automock;

use crate::decision::engine::Decision;

/// What the user did with a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Update,
    Later,
    Ignore,
    /// Closed by any other path, e.g. the window was dismissed
    Dismissed,
}

/// Everything a presenter needs to render one prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub decision: Decision,
    pub listing_url: Option<String>,
    /// Present only when release notes are enabled and published
    pub release_notes: Option<String>,
}

impl PromptRequest {
    pub fn allows(&self, action: UserAction) -> bool {
        match action {
            UserAction::Update | UserAction::Dismissed => true,
            UserAction::Later => self.decision.show_later,
            UserAction::Ignore => self.decision.show_ignore,
        }
    }
}

/// Renders a prompt and waits for the user's choice
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Presenter: Send + Sync {
    async fn present(&self, request: &PromptRequest) -> UserAction;
}

/// Callbacks invoked exactly once per user action, after the alert state has
/// been recorded. Launching the listing URL on update belongs here.
#[cfg_attr(test, automock)]
pub trait ActionHandler: Send + Sync {
    fn on_update(&self, _request: &PromptRequest) {}

    fn on_later(&self, _request: &PromptRequest) {}

    fn on_ignore(&self, _request: &PromptRequest) {}

    fn on_dismissed(&self, _request: &PromptRequest) {}
}
