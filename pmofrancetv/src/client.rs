//! HTTP client for the France.tv APIs
//!
//! This module issues the GET requests against the mobile catalog API and
//! the video metadata API. It does not cache anything: caching belongs to
//! [`ContentResolver`](crate::resolver::ContentResolver).
//!
//! # Example
//!
//! ```no_run
//! use pmofrancetv::FranceTvClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FranceTvClient::new()?;
//!     let page = client.fetch_json(&client.channel_url("france-2")).await?;
//!     println!("{}", page);
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Default mobile API base URL (catalog, programs, search)
pub const DEFAULT_MOBILE_API_URL: &str = "https://api-mobile.yatta.francetv.fr";

/// Default video API base URL (playback metadata)
pub const DEFAULT_VIDEO_API_URL: &str = "https://k7.ftven.fr/videos";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Desktop browser User-Agent; the upstream gates some traffic on it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Query string expected by the video API
const VIDEO_QUERY: &str = "country_code=FR&domain=www.france.tv&os=android&browser=firefox";

/// France.tv HTTP client
///
/// Every request carries `Accept: application/json` and the browser
/// User-Agent. No retries: one failed fetch fails the calling operation.
#[derive(Debug, Clone)]
pub struct FranceTvClient {
    pub(crate) client: Client,
    mobile_api_url: String,
    video_api_url: String,
    timeout: Duration,
    user_agent: String,
}

impl FranceTvClient {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Mobile API base URL
    pub fn mobile_api_url(&self) -> &str {
        &self.mobile_api_url
    }

    /// Video API base URL
    pub fn video_api_url(&self) -> &str {
        &self.video_api_url
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Channel page: collections of videos, live slot…
    pub fn channel_url(&self, channel_id: &str) -> String {
        format!(
            "{}/apps/channels/{}?platform=apps",
            self.mobile_api_url, channel_id
        )
    }

    /// Programs of a channel
    pub fn programs_url(&self, channel_id: &str) -> String {
        format!(
            "{}/apps/regions/{}/programs?platform=apps",
            self.mobile_api_url, channel_id
        )
    }

    /// Search across the catalog
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/apps/search?term={}&platform=apps",
            self.mobile_api_url,
            urlencoding::encode(query)
        )
    }

    /// Playback metadata of a video
    pub fn video_url(&self, video_id: &str) -> String {
        format!("{}/{}?{}", self.video_api_url, video_id, VIDEO_QUERY)
    }

    /// Token exchange call for `candidate`
    ///
    /// The endpoint comes from the video metadata and already carries a
    /// query string, hence the `&`.
    pub fn token_url(endpoint: &str, candidate: &str) -> String {
        format!("{}&url={}", endpoint, urlencoding::encode(candidate))
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// GET `url` and parse the body as JSON
    ///
    /// Fails on transport errors, on non-2xx statuses and on invalid JSON.
    pub async fn fetch_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Request to {} failed: {}", url, e);
                Error::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Request to {} returned {}", url, status);
            return Err(Error::Status {
                status,
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// GET `url` and decode the JSON body into `T`
    pub async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let value = self.fetch_json(url).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Builder for [`FranceTvClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    mobile_api_url: String,
    video_api_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            mobile_api_url: DEFAULT_MOBILE_API_URL.to_string(),
            video_api_url: DEFAULT_VIDEO_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    ///
    /// Connection settings come from `client`; the `Accept` and User-Agent
    /// headers are still set on every request.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the mobile API base URL
    pub fn mobile_api_url(mut self, url: impl Into<String>) -> Self {
        self.mobile_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the video API base URL
    pub fn video_api_url(mut self, url: impl Into<String>) -> Self {
        self.video_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<FranceTvClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder().timeout(self.timeout).build()?,
        };

        Ok(FranceTvClient {
            client,
            mobile_api_url: self.mobile_api_url,
            video_api_url: self.video_api_url,
            timeout: self.timeout,
            user_agent: self.user_agent,
        })
    }
}
