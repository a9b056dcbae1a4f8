//! Persisted record of what the user has been shown and has dismissed

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::StorageError;
use crate::store::kv::KeyValueStore;
use crate::version::semver::{AppVersion, parse_lenient};

pub const LAST_TIME_ALERTED_KEY: &str = "lastTimeAlerted";
pub const LAST_VERSION_ALERTED_KEY: &str = "lastVersionAlerted";
pub const USER_IGNORED_VERSION_KEY: &str = "userIgnoredVersion";

const ALL_KEYS: [&str; 3] = [
    LAST_TIME_ALERTED_KEY,
    LAST_VERSION_ALERTED_KEY,
    USER_IGNORED_VERSION_KEY,
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    pub last_alerted_at: Option<DateTime<Utc>>,
    pub last_version_alerted: Option<AppVersion>,
    pub user_ignored_version: Option<AppVersion>,
}

/// Owns the [`AlertState`] and its persistence.
///
/// The state is read from storage once by [`load`](Self::load) and kept in
/// memory afterwards; the recording operations update the in-memory copy
/// before writing so the running session honours an action even when the
/// write fails.
pub struct AlertStateStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    state: Mutex<AlertState>,
}

impl AlertStateStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            state: Mutex::new(AlertState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, AlertState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read the persisted state. Never fails: a storage error yields an
    /// empty state and unparsable values are treated as absent.
    pub async fn load(&self) -> AlertState {
        let state = self
            .read_state()
            .await
            .inspect_err(|e| warn!("Failed to read alert state, starting empty: {}", e))
            .unwrap_or_default();

        debug!("Loaded alert state: {:?}", state);
        *self.lock_state() = state.clone();
        state
    }

    async fn read_state(&self) -> Result<AlertState, StorageError> {
        let last_alerted_at = self
            .storage
            .get_string(LAST_TIME_ALERTED_KEY)
            .await?
            .and_then(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .inspect_err(|e| {
                        warn!("Ignoring unparsable {} {:?}: {}", LAST_TIME_ALERTED_KEY, raw, e)
                    })
                    .ok()
            })
            .map(|at| at.with_timezone(&Utc));

        let last_version_alerted = self
            .storage
            .get_string(LAST_VERSION_ALERTED_KEY)
            .await?
            .and_then(|raw| parse_lenient(&raw, LAST_VERSION_ALERTED_KEY));

        let user_ignored_version = self
            .storage
            .get_string(USER_IGNORED_VERSION_KEY)
            .await?
            .and_then(|raw| parse_lenient(&raw, USER_IGNORED_VERSION_KEY));

        Ok(AlertState {
            last_alerted_at,
            last_version_alerted,
            user_ignored_version,
        })
    }

    /// The in-memory state as of the last load or recording operation
    pub fn state(&self) -> AlertState {
        self.lock_state().clone()
    }

    /// Remember that a prompt is being shown now.
    ///
    /// The time is always recorded; the version only when the prompt is for a
    /// known release, otherwise the previously alerted version is kept.
    pub async fn record_alert_shown(
        &self,
        version: Option<&AppVersion>,
    ) -> Result<(), StorageError> {
        let now = self.clock.now();
        {
            let mut state = self.lock_state();
            state.last_alerted_at = Some(now);
            if let Some(version) = version {
                state.last_version_alerted = Some(version.clone());
            }
        }

        let mut values = vec![(LAST_TIME_ALERTED_KEY.to_string(), now.to_rfc3339())];
        if let Some(version) = version {
            values.push((LAST_VERSION_ALERTED_KEY.to_string(), version.to_string()));
        }

        self.storage
            .set_many(values)
            .await
            .inspect_err(|e| error!("Failed to persist alert shown at {}: {}", now, e))?;

        info!(
            "Recorded alert at {} for version {:?}",
            now,
            version.map(ToString::to_string)
        );
        Ok(())
    }

    /// Remember that the user chose to ignore `version`.
    pub async fn record_user_ignored(&self, version: &AppVersion) -> Result<(), StorageError> {
        self.lock_state().user_ignored_version = Some(version.clone());

        self.storage
            .set_string(USER_IGNORED_VERSION_KEY, &version.to_string())
            .await
            .inspect_err(|e| error!("Failed to persist ignored version {}: {}", version, e))?;

        info!("User ignored version {}", version);
        Ok(())
    }

    /// Forget every recorded alert and dismissal.
    pub async fn reset(&self) -> Result<(), StorageError> {
        *self.lock_state() = AlertState::default();

        for key in ALL_KEYS {
            self.storage
                .remove(key)
                .await
                .inspect_err(|e| error!("Failed to clear {}: {}", key, e))?;
        }

        info!("Cleared saved alert state");
        Ok(())
    }
}
