//! Provider reading a JSON release feed from the local filesystem

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FeedError;
use crate::feed::provider::FeedProvider;
use crate::feed::providers::parse_feed_document;
use crate::feed::types::{FeedRequest, ReleaseEntry};

pub struct FileFeedProvider {
    path: PathBuf,
}

impl FileFeedProvider {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl FeedProvider for FileFeedProvider {
    async fn fetch(&self, _request: &FeedRequest) -> Result<Vec<ReleaseEntry>, FeedError> {
        debug!("Reading release feed from {:?}", self.path);

        let body = match tokio::fs::read(&self.path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FeedError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        parse_feed_document(&body)
    }
}
