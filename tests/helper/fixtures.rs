//! On-disk feed and preference fixtures

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tempfile::TempDir;

use upgrade_alert::clock::ManualClock;
use upgrade_alert::config::AlertConfig;
use upgrade_alert::feed::HostInfo;
use upgrade_alert::feed::provider::StaticVersionProvider;
use upgrade_alert::feed::providers::FileFeedProvider;
use upgrade_alert::session::{Presenter, SessionBuilder, SessionController};
use upgrade_alert::store::SqliteStore;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

/// A temporary directory holding a JSON feed file and an alert-state
/// database, shared by every session built from it.
pub struct FeedFixture {
    dir: TempDir,
}

impl FeedFixture {
    pub fn new(feed: Value) -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
        };
        fixture.publish(feed);
        fixture
    }

    /// Replace the published feed
    pub fn publish(&self, feed: Value) {
        std::fs::write(self.feed_path(), serde_json::to_vec(&feed).unwrap()).unwrap();
    }

    pub fn unpublish(&self) {
        std::fs::remove_file(self.feed_path()).unwrap();
    }

    pub fn feed_path(&self) -> PathBuf {
        self.dir.path().join("feed.json")
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("alert-state.db")
    }
}

/// Build a session the way an application would at launch: fresh providers,
/// the fixture's database and a shared clock.
pub fn build_session(
    fixture: &FeedFixture,
    config: AlertConfig,
    installed: &str,
    host: HostInfo,
    clock: Arc<ManualClock>,
    presenter: Arc<dyn Presenter>,
) -> SessionController {
    let store = SqliteStore::new(&fixture.db_path()).unwrap();

    SessionBuilder::new(
        config,
        Arc::new(FileFeedProvider::new(&fixture.feed_path())),
        Arc::new(StaticVersionProvider::new(installed)),
        Arc::new(store),
        presenter,
    )
    .clock(clock)
    .host(host)
    .build()
}
