//! Feed provider implementations

pub mod file;
pub mod json_feed;
pub mod static_feed;

pub use file::FileFeedProvider;
pub use json_feed::JsonFeedProvider;
pub use static_feed::StaticFeedProvider;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::FeedError;
use crate::feed::types::ReleaseEntry;

/// Curated JSON feed document: either `{"releases": [...]}` or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedDocument {
    Wrapped { releases: Vec<Value> },
    Bare(Vec<Value>),
}

/// Decode a feed document. Entries that do not fit [`ReleaseEntry`] are
/// skipped with a warning; only a malformed document fails as a whole.
pub(crate) fn parse_feed_document(body: &[u8]) -> Result<Vec<ReleaseEntry>, FeedError> {
    let document: FeedDocument =
        serde_json::from_slice(body).map_err(|e| FeedError::InvalidResponse(e.to_string()))?;

    let raw = match document {
        FeedDocument::Wrapped { releases } => releases,
        FeedDocument::Bare(releases) => releases,
    };

    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            serde_json::from_value::<ReleaseEntry>(value)
                .inspect_err(|e| warn!("Skipping malformed feed entry #{}: {}", index, e))
                .ok()
        })
        .collect())
}
