//! Hook for reporting every decision, e.g. to metrics

#[cfg(test)]
use mockall::automock;

use crate::decision::engine::Decision;
use crate::version::semver::AppVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionReport {
    pub should_show: bool,
    pub min_app_version: Option<AppVersion>,
    pub installed_version: Option<AppVersion>,
    pub latest_version: Option<AppVersion>,
}

impl From<&Decision> for DecisionReport {
    fn from(decision: &Decision) -> Self {
        Self {
            should_show: decision.should_show,
            min_app_version: decision.min_app_version.clone(),
            installed_version: decision.installed_version.clone(),
            latest_version: decision.latest_version.clone(),
        }
    }
}

/// Called exactly once per evaluation. Not consulted for control flow.
#[cfg_attr(test, automock)]
pub trait DecisionObserver: Send + Sync {
    fn on_decision_made(&self, report: &DecisionReport);
}
