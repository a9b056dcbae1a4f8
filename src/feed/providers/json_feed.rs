//! HTTP provider for curated JSON release feeds

use std::time::Duration;

use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::config::FETCH_TIMEOUT_MS;
use crate::error::FeedError;
use crate::feed::provider::FeedProvider;
use crate::feed::providers::parse_feed_document;
use crate::feed::types::{FeedRequest, ReleaseEntry};

/// Feed provider that downloads a JSON feed over HTTP.
///
/// The request's app id and locale are appended as `appId` / `locale`
/// query parameters so one endpoint can serve several applications.
pub struct JsonFeedProvider {
    client: reqwest::Client,
    url: String,
}

impl JsonFeedProvider {
    pub fn new(url: &str) -> Result<Self, FeedError> {
        Self::with_timeout(url, Duration::from_millis(FETCH_TIMEOUT_MS as u64))
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("upgrade-alert/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    fn request_url(&self, request: &FeedRequest) -> Result<Url, FeedError> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| FeedError::InvalidUrl(format!("{}: {}", self.url, e)))?;

        {
            let mut query = url.query_pairs_mut();
            if let Some(app_id) = &request.app_id {
                query.append_pair("appId", app_id);
            }
            if let Some(locale) = &request.locale {
                query.append_pair("locale", locale);
            }
        }

        // query_pairs_mut leaves a dangling '?' when nothing was appended
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }
}

#[async_trait::async_trait]
impl FeedProvider for JsonFeedProvider {
    async fn fetch(&self, request: &FeedRequest) -> Result<Vec<ReleaseEntry>, FeedError> {
        let url = self.request_url(request)?;
        debug!("Fetching release feed: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FeedError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            warn!("Release feed returned status {}: {}", status, url);
            return Err(FeedError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body = response.bytes().await?;
        let releases = parse_feed_document(&body)
            .inspect_err(|e| warn!("Failed to parse release feed {}: {}", url, e))?;

        debug!("Feed {} listed {} releases", url, releases.len());

        Ok(releases)
    }
}
