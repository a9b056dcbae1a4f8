//! In-memory feed provider

use crate::error::FeedError;
use crate::feed::provider::FeedProvider;
use crate::feed::types::{FeedRequest, ReleaseEntry};

/// Serves a fixed list of releases, for embedding applications that obtain
/// their feed some other way and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFeedProvider {
    releases: Vec<ReleaseEntry>,
}

impl StaticFeedProvider {
    pub fn new(releases: Vec<ReleaseEntry>) -> Self {
        Self { releases }
    }
}

#[async_trait::async_trait]
impl FeedProvider for StaticFeedProvider {
    async fn fetch(&self, _request: &FeedRequest) -> Result<Vec<ReleaseEntry>, FeedError> {
        Ok(self.releases.clone())
    }
}
