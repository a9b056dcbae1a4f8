//! One check → prompt → record cycle per session

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::AlertConfig;
use crate::decision::engine::{Decision, DecisionEngine};
use crate::decision::observer::DecisionObserver;
use crate::error::{SessionError, StorageError};
use crate::feed::normalizer::normalize;
use crate::feed::provider::{FeedProvider, VersionProvider};
use crate::feed::types::{FeedRequest, FeedResult, HostInfo};
use crate::session::presenter::{ActionHandler, Presenter, PromptRequest, UserAction};
use crate::store::alert_state::{AlertState, AlertStateStore};
use crate::store::kv::KeyValueStore;
use crate::version::semver::{AppVersion, parse_lenient};

/// Inputs fetched once per session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub installed_version: Option<AppVersion>,
    pub feed: FeedResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    NotInitialized,
    Initializing,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Evaluated and nothing shown
    Suppressed(Decision),
    /// Shown and answered. `persisted` is false when recording the alert
    /// or the user's choice failed; the session still honours both.
    Presented {
        decision: Decision,
        action: UserAction,
        persisted: bool,
    },
    /// Another prompt from this session is still on screen
    AlreadyDisplaying,
}

/// Sets a flag for as long as it lives; cleared on every exit path.
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SessionBuilder {
    config: AlertConfig,
    feed_provider: Arc<dyn FeedProvider>,
    version_provider: Arc<dyn VersionProvider>,
    storage: Arc<dyn KeyValueStore>,
    presenter: Arc<dyn Presenter>,
    clock: Arc<dyn Clock>,
    host: HostInfo,
    observer: Option<Arc<dyn DecisionObserver>>,
    action_handler: Option<Arc<dyn ActionHandler>>,
}

impl SessionBuilder {
    pub fn new(
        config: AlertConfig,
        feed_provider: Arc<dyn FeedProvider>,
        version_provider: Arc<dyn VersionProvider>,
        storage: Arc<dyn KeyValueStore>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            config,
            feed_provider,
            version_provider,
            storage,
            presenter,
            clock: Arc::new(SystemClock),
            host: HostInfo::default(),
            observer: None,
            action_handler: None,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn host(mut self, host: HostInfo) -> Self {
        self.host = host;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn DecisionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn action_handler(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.action_handler = Some(handler);
        self
    }

    pub fn build(self) -> SessionController {
        let mut engine = DecisionEngine::new(self.config);
        if let Some(observer) = self.observer {
            engine = engine.with_observer(observer);
        }

        SessionController {
            engine,
            store: AlertStateStore::new(self.storage, self.clock.clone()),
            feed_provider: self.feed_provider,
            version_provider: self.version_provider,
            presenter: self.presenter,
            action_handler: self.action_handler,
            clock: self.clock,
            host: self.host,
            snapshot: OnceCell::new(),
            initializing: AtomicBool::new(false),
            displaying: AtomicBool::new(false),
        }
    }
}

/// Coordinates initialization, evaluation, presentation and recording.
///
/// Initialization runs at most once: concurrent callers wait on the same
/// in-flight work and later callers get the cached snapshot. At most one
/// prompt is on screen at a time.
pub struct SessionController {
    engine: DecisionEngine,
    store: AlertStateStore,
    feed_provider: Arc<dyn FeedProvider>,
    version_provider: Arc<dyn VersionProvider>,
    presenter: Arc<dyn Presenter>,
    action_handler: Option<Arc<dyn ActionHandler>>,
    clock: Arc<dyn Clock>,
    host: HostInfo,
    snapshot: OnceCell<Arc<SessionSnapshot>>,
    initializing: AtomicBool,
    displaying: AtomicBool,
}

impl SessionController {
    pub fn init_state(&self) -> InitState {
        if self.snapshot.initialized() {
            InitState::Ready
        } else if self.initializing.load(Ordering::Acquire) {
            InitState::Initializing
        } else {
            InitState::NotInitialized
        }
    }

    pub async fn initialize(&self) -> Arc<SessionSnapshot> {
        self.snapshot
            .get_or_init(|| async {
                let _busy = FlagGuard::acquire(&self.initializing);
                Arc::new(self.load_snapshot().await)
            })
            .await
            .clone()
    }

    /// Load preferences, then the installed version, then the feed.
    /// Feed failures are logged and treated as "no update available".
    async fn load_snapshot(&self) -> SessionSnapshot {
        self.store.load().await;

        let raw_installed = self.version_provider.current_version().await;
        let installed_version = parse_lenient(&raw_installed, "installed version");

        let config = self.engine.config();
        let request = FeedRequest {
            app_id: config.app_id.clone(),
            locale: config.locale.clone(),
        };
        let entries = self
            .feed_provider
            .fetch(&request)
            .await
            .inspect_err(|e| warn!("Failed to fetch release feed, assuming no update: {}", e))
            .unwrap_or_default();

        let feed = normalize(&entries, installed_version.as_ref(), &self.host);

        info!(
            "Session initialized: installed={:?}, latest={:?}",
            installed_version.as_ref().map(ToString::to_string),
            feed.latest_version.as_ref().map(ToString::to_string)
        );

        SessionSnapshot {
            installed_version,
            feed,
        }
    }

    /// The snapshot, if initialization has completed
    pub fn snapshot(&self) -> Option<Arc<SessionSnapshot>> {
        self.snapshot.get().cloned()
    }

    pub fn alert_state(&self) -> AlertState {
        self.store.state()
    }

    /// Evaluate against the current alert state.
    ///
    /// Fails with [`SessionError::NotInitialized`] until
    /// [`initialize`](Self::initialize) has completed.
    pub fn decision(&self) -> Result<Decision, SessionError> {
        let snapshot = self.snapshot.get().ok_or(SessionError::NotInitialized)?;
        Ok(self.evaluate(snapshot))
    }

    fn evaluate(&self, snapshot: &SessionSnapshot) -> Decision {
        let state = self.store.state();
        let ctx = self.engine.context(
            snapshot.installed_version.as_ref(),
            &snapshot.feed,
            &state,
            self.clock.now(),
        );
        self.engine.evaluate(&ctx)
    }

    fn prompt_request(&self, snapshot: &SessionSnapshot, decision: Decision) -> PromptRequest {
        let release_notes = if self.engine.config().show_release_notes {
            snapshot.feed.release_notes.clone()
        } else {
            None
        };

        PromptRequest {
            decision,
            listing_url: snapshot.feed.listing_url.clone(),
            release_notes,
        }
    }

    /// Run one full cycle: initialize if needed, evaluate, and present the
    /// prompt when the decision says so.
    pub async fn check_and_prompt(&self) -> PromptOutcome {
        let snapshot = self.initialize().await;
        let decision = self.evaluate(&snapshot);

        if !decision.should_show {
            debug!("Not prompting: {:?}", decision.reason);
            return PromptOutcome::Suppressed(decision);
        }

        let Some(displaying) = FlagGuard::acquire(&self.displaying) else {
            debug!("Prompt already on screen, skipping");
            return PromptOutcome::AlreadyDisplaying;
        };

        let request = self.prompt_request(&snapshot, decision);

        let alert_recorded = self
            .store
            .record_alert_shown(request.decision.latest_version.as_ref())
            .await
            .is_ok();

        let action = self.presenter.present(&request).await;
        drop(displaying);

        info!("User chose {:?}", action);
        let action_recorded = self.handle_action(&request, action).await;

        PromptOutcome::Presented {
            decision: request.decision,
            action,
            persisted: alert_recorded && action_recorded,
        }
    }

    /// Record and dispatch the user's choice. Returns false if recording it
    /// failed.
    async fn handle_action(&self, request: &PromptRequest, action: UserAction) -> bool {
        let mut recorded = true;
        if action == UserAction::Ignore {
            match &request.decision.latest_version {
                Some(latest) if request.allows(UserAction::Ignore) => {
                    recorded = self.store.record_user_ignored(latest).await.is_ok();
                }
                Some(_) => warn!("Ignore was not offered for this prompt, not recording it"),
                None => debug!("No published version to ignore"),
            }
        }

        if let Some(handler) = &self.action_handler {
            match action {
                UserAction::Update => handler.on_update(request),
                UserAction::Later => handler.on_later(request),
                UserAction::Ignore => handler.on_ignore(request),
                UserAction::Dismissed => handler.on_dismissed(request),
            }
        }

        recorded
    }

    /// Clear every persisted alert and dismissal
    pub async fn reset(&self) -> Result<(), StorageError> {
        self.store.reset().await
    }
}
