//! Feed provider trait for fetching published releases from various sources

#[cfg(test)]
use mockall::automock;

use crate::error::FeedError;
use crate::feed::types::{FeedRequest, ReleaseEntry};

/// Trait for fetching the releases published for an application
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    /// Fetches every release the feed currently publishes
    ///
    /// # Arguments
    /// * `request` - Application identity and locale the feed is asked about
    ///
    /// # Returns
    /// * `Ok(Vec<ReleaseEntry>)` - Raw entries in feed order, not yet validated
    /// * `Err(FeedError)` - If the feed could not be fetched or decoded
    async fn fetch(&self, request: &FeedRequest) -> Result<Vec<ReleaseEntry>, FeedError>;
}

/// Trait for reading the version of the running application
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionProvider: Send + Sync {
    async fn current_version(&self) -> String;
}

/// Version provider for a version known up front, e.g. from `CARGO_PKG_VERSION`
#[derive(Debug, Clone)]
pub struct StaticVersionProvider(String);

impl StaticVersionProvider {
    pub fn new(version: &str) -> Self {
        Self(version.to_string())
    }
}

#[async_trait::async_trait]
impl VersionProvider for StaticVersionProvider {
    async fn current_version(&self) -> String {
        self.0.clone()
    }
}
