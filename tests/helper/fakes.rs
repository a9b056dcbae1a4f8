//! Hand-written collaborators for driving a session from a test

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use upgrade_alert::error::FeedError;
use upgrade_alert::feed::provider::FeedProvider;
use upgrade_alert::feed::{FeedRequest, ReleaseEntry};
use upgrade_alert::session::{Presenter, PromptRequest, UserAction};

/// Answers prompts from a script and remembers every request.
/// Answers `Dismissed` once the script runs out.
#[derive(Default)]
pub struct ScriptedPresenter {
    answers: Mutex<VecDeque<UserAction>>,
    requests: Mutex<Vec<PromptRequest>>,
}

impl ScriptedPresenter {
    pub fn answering(answers: &[UserAction]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<PromptRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Presenter for ScriptedPresenter {
    async fn present(&self, request: &PromptRequest) -> UserAction {
        self.requests.lock().unwrap().push(request.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(UserAction::Dismissed)
    }
}

/// Feed that blocks inside `fetch` until released
pub struct GatedFeedProvider {
    entries: Vec<ReleaseEntry>,
    pub started: Notify,
    pub release: Notify,
    calls: AtomicUsize,
}

impl GatedFeedProvider {
    pub fn new(entries: Vec<ReleaseEntry>) -> Self {
        Self {
            entries,
            started: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedProvider for GatedFeedProvider {
    async fn fetch(&self, _request: &FeedRequest) -> Result<Vec<ReleaseEntry>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.entries.clone())
    }
}

/// Presenter that stays on screen until released
pub struct GatedPresenter {
    answer: UserAction,
    pub entered: Notify,
    pub release: Notify,
    shown: AtomicUsize,
}

impl GatedPresenter {
    pub fn new(answer: UserAction) -> Self {
        Self {
            answer,
            entered: Notify::new(),
            release: Notify::new(),
            shown: AtomicUsize::new(0),
        }
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Presenter for GatedPresenter {
    async fn present(&self, _request: &PromptRequest) -> UserAction {
        self.shown.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        self.answer
    }
}
