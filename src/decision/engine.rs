//! Upgrade prompt decision

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::AlertConfig;
use crate::decision::observer::{DecisionObserver, DecisionReport};
use crate::feed::types::FeedResult;
use crate::store::alert_state::AlertState;
use crate::version::semver::{AppVersion, parse_lenient};

/// Why a prompt is or is not shown. The first matching rule wins, in the
/// order the variants are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// A debug flag forces the prompt
    DebugOverride,
    /// No newer version is published, or it is unknown
    NoUpdateAvailable,
    /// Installed version is below the minimum or a critical release
    Blocked,
    /// The user was prompted within the throttle interval
    TooSoon,
    /// The user already chose to ignore this version
    AlreadyIgnored,
    UpdateAvailable,
}

impl DecisionReason {
    pub fn shows_prompt(self) -> bool {
        matches!(self, Self::DebugOverride | Self::Blocked | Self::UpdateAvailable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub should_show: bool,
    /// The user may only update; ignore and later are withheld
    pub blocked: bool,
    pub reason: DecisionReason,
    /// `None` when the running version could not be parsed
    pub installed_version: Option<AppVersion>,
    pub latest_version: Option<AppVersion>,
    /// Effective minimum supported version
    pub min_app_version: Option<AppVersion>,
    pub show_ignore: bool,
    pub show_later: bool,
}

/// Everything one evaluation looks at. Built per check and not retained.
#[derive(Debug, Clone)]
pub struct DecisionContext<'a> {
    pub installed_version: Option<&'a AppVersion>,
    pub feed: &'a FeedResult,
    pub min_app_version_override: Option<&'a AppVersion>,
    pub state: &'a AlertState,
    pub config: &'a AlertConfig,
    pub now: DateTime<Utc>,
}

/// Compute the decision for one check. Pure: identical contexts always
/// produce identical decisions.
pub fn evaluate(ctx: &DecisionContext<'_>) -> Decision {
    let min_app_version = ctx
        .min_app_version_override
        .or(ctx.feed.min_app_version.as_ref());
    let below_minimum = match (ctx.installed_version, min_app_version) {
        (Some(installed), Some(min)) => installed < min,
        _ => false,
    };
    let blocked = below_minimum || ctx.feed.is_critical;

    let reason = decide_reason(ctx, blocked);

    Decision {
        should_show: reason.shows_prompt(),
        blocked,
        reason,
        installed_version: ctx.installed_version.cloned(),
        latest_version: ctx.feed.latest_version.clone(),
        min_app_version: min_app_version.cloned(),
        show_ignore: ctx.config.show_ignore && !blocked,
        show_later: ctx.config.show_later && !blocked,
    }
}

fn decide_reason(ctx: &DecisionContext<'_>, blocked: bool) -> DecisionReason {
    let config = ctx.config;
    let state = ctx.state;

    if config.debug_always_show || (config.debug_show_once && state.last_alerted_at.is_none()) {
        return DecisionReason::DebugOverride;
    }

    let Some(latest) = ctx
        .feed
        .latest_version
        .as_ref()
        .filter(|latest| ctx.installed_version.is_some_and(|installed| *latest > installed))
    else {
        return DecisionReason::NoUpdateAvailable;
    };

    if blocked {
        return DecisionReason::Blocked;
    }

    if let Some(last_alerted_at) = state.last_alerted_at
        && ctx.now - last_alerted_at < config.throttle_duration()
    {
        return DecisionReason::TooSoon;
    }

    if state.user_ignored_version.as_ref() == Some(latest) {
        return DecisionReason::AlreadyIgnored;
    }

    DecisionReason::UpdateAvailable
}

/// Evaluates decisions with a fixed configuration and reports each one to
/// an optional observer.
pub struct DecisionEngine {
    config: AlertConfig,
    min_app_version_override: Option<AppVersion>,
    observer: Option<Arc<dyn DecisionObserver>>,
}

impl DecisionEngine {
    pub fn new(config: AlertConfig) -> Self {
        let min_app_version_override = config
            .min_app_version
            .as_deref()
            .and_then(|v| parse_lenient(v, "configured minimum app version"));

        Self {
            config,
            min_app_version_override,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn DecisionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Build the context for one evaluation from this engine's configuration
    pub fn context<'a>(
        &'a self,
        installed_version: Option<&'a AppVersion>,
        feed: &'a FeedResult,
        state: &'a AlertState,
        now: DateTime<Utc>,
    ) -> DecisionContext<'a> {
        DecisionContext {
            installed_version,
            feed,
            min_app_version_override: self.min_app_version_override.as_ref(),
            state,
            config: &self.config,
            now,
        }
    }

    /// Evaluate and notify the observer exactly once, whatever the outcome
    pub fn evaluate(&self, ctx: &DecisionContext<'_>) -> Decision {
        let decision = evaluate(ctx);

        debug!("Upgrade decision: {:?}", decision);
        if decision.should_show {
            info!(
                "Prompting for upgrade to {:?} ({:?})",
                decision.latest_version.as_ref().map(ToString::to_string),
                decision.reason
            );
        }

        if let Some(observer) = &self.observer {
            observer.on_decision_made(&DecisionReport::from(&decision));
        }

        decision
    }
}
