//! Stream resolution: video id → playable URL
//!
//! Resolution runs in three steps: playback metadata fetch, DRM check, then
//! an optional token exchange that turns the base URL into a signed
//! delivery URL. Nothing here is cached, stream URLs are short-lived.

use crate::client::FranceTvClient;
use crate::error::Error;
use crate::models::{ResolvedStream, StreamDetails, TokenResponse, VideoResponse};
use tracing::{debug, error, info, warn};

/// Outcome of the token-exchange request
///
/// Failure is not an error for the caller: the unsigned URL is kept as a
/// best-effort fallback.
#[derive(Debug)]
pub enum TokenExchange {
    /// The endpoint returned a replacement URL
    Exchanged(String),
    /// The endpoint answered without a URL
    Unchanged,
    /// The request failed
    Failed(Error),
}

impl TokenExchange {
    /// Final playback URL given the pre-exchange `candidate`
    pub fn into_url(self, candidate: String) -> String {
        match self {
            Self::Exchanged(url) => url,
            Self::Unchanged | Self::Failed(_) => candidate,
        }
    }
}

/// Resolves video identifiers into [`ResolvedStream`]s
#[derive(Debug, Clone)]
pub struct StreamResolver {
    client: FranceTvClient,
}

impl StreamResolver {
    pub fn new(client: FranceTvClient) -> Self {
        Self { client }
    }

    /// Resolves `video_id`
    ///
    /// `None` means "no stream available": the metadata fetch failed, the
    /// identifier is unknown, or the payload has neither DRM flag nor URL.
    /// A DRM-protected video resolves to a stream without playback URL.
    pub async fn resolve(&self, video_id: &str) -> Option<ResolvedStream> {
        info!("Resolving video {}", video_id);

        let response: VideoResponse = match self.client.fetch(&self.client.video_url(video_id)).await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Video {} metadata fetch failed: {}", video_id, e);
                return None;
            }
        };

        let Some(video) = response.video else {
            info!("No video payload for {}", video_id);
            return None;
        };

        let meta = response.meta.unwrap_or_default();
        let details = StreamDetails {
            title: meta.title.unwrap_or_default(),
            description: meta.description,
            duration_seconds: video.duration,
            image_url: meta.image_url,
        };

        if video.is_drm() {
            warn!("Video {} is DRM protected", video_id);
            return Some(ResolvedStream::drm_protected(video_id, details));
        }

        let Some(candidate) = video.url.filter(|u| !u.is_empty()) else {
            warn!("Video {} has no playback URL", video_id);
            return None;
        };

        let playback_url = match video.token.and_then(|t| t.akamai) {
            Some(endpoint) => {
                let exchange = self.exchange_token(&endpoint, &candidate).await;
                if let TokenExchange::Failed(e) = &exchange {
                    warn!("Token exchange failed for {}, keeping base URL: {}", video_id, e);
                }
                exchange.into_url(candidate)
            }
            None => candidate,
        };

        debug!("Video {} resolved to {}", video_id, playback_url);
        Some(ResolvedStream::playable(
            video_id,
            details,
            playback_url,
            video.format,
        ))
    }

    /// Calls the token endpoint with `candidate` attached
    pub async fn exchange_token(&self, endpoint: &str, candidate: &str) -> TokenExchange {
        let url = FranceTvClient::token_url(endpoint, candidate);
        match self.client.fetch::<TokenResponse>(&url).await {
            Ok(TokenResponse { url: Some(signed) }) if !signed.is_empty() => {
                TokenExchange::Exchanged(signed)
            }
            Ok(_) => TokenExchange::Unchanged,
            Err(e) => TokenExchange::Failed(e),
        }
    }
}
