//! Catalog queries over the France.tv mobile API
//!
//! [`ContentResolver`] turns channel pages, program lists and search
//! results into [`Video`]/[`Program`] sequences. Catalog-shaped queries go
//! through a [`TtlCache`]; live lookups and stream resolution do not.

use crate::cache::TtlCache;
use crate::client::FranceTvClient;
use crate::error::Result;
use crate::models::{ChannelResponse, Program, ProgramsResponse, RawItem, ResolvedStream, Video};
use crate::normalize::{decode_item, normalize_program, normalize_video};
use crate::stream::StreamResolver;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info};

/// Channel page the rugby catalog is filtered from
pub const SPORT_CHANNEL: &str = "sport";

/// Label of the search collection holding videos
pub const SEARCH_VIDEOS_LABEL: &str = "Vidéos";

/// Collection type of the live slot on a channel page
pub const LIVE_COLLECTION_TYPE: &str = "live";

/// Lowercase keywords selecting rugby items (matched as substrings)
pub const RUGBY_KEYWORDS: &[&str] = &[
    "rugby",
    " xv",
    "top 14",
    "six nations",
    "champions cup",
    "challenge cup",
    "pro d2",
    "crunch",
    "all blacks",
    "springboks",
    "wallabies",
];

/// High-level France.tv catalog access with caching
#[derive(Clone)]
pub struct ContentResolver {
    client: FranceTvClient,
    streams: StreamResolver,
    videos: TtlCache<Vec<Video>>,
    programs: TtlCache<Vec<Program>>,
}

impl ContentResolver {
    /// Resolver with 30-minute unbounded caches
    pub fn new(client: FranceTvClient) -> Self {
        Self::with_caches(client, TtlCache::default(), TtlCache::default())
    }

    /// Resolver whose caches all use `ttl`
    pub fn with_ttl(client: FranceTvClient, ttl: Duration) -> Self {
        Self::with_caches(client, TtlCache::new(ttl), TtlCache::new(ttl))
    }

    /// Resolver using the given caches
    pub fn with_caches(
        client: FranceTvClient,
        videos: TtlCache<Vec<Video>>,
        programs: TtlCache<Vec<Program>>,
    ) -> Self {
        Self {
            streams: StreamResolver::new(client.clone()),
            client,
            videos,
            programs,
        }
    }

    // ========================================================================
    // Cached catalog queries
    // ========================================================================

    /// Every video of a channel page, deduplicated in first-seen order
    pub async fn get_channel_content(&self, channel_id: &str) -> Result<Vec<Video>> {
        let key = format!("channel_{}", channel_id);
        self.videos
            .get_or_compute(&key, || async {
                info!("Fetching content of {}", channel_id);
                let page: ChannelResponse =
                    self.client.fetch(&self.client.channel_url(channel_id)).await?;

                let videos = dedup_by_id(
                    page.collections
                        .iter()
                        .flat_map(|c| c.items.iter())
                        .filter_map(decode_item)
                        .filter_map(|item| normalize_video(&item)),
                );

                info!("{} videos found for {}", videos.len(), channel_id);
                Ok(videos)
            })
            .await
    }

    /// Programs (shows) of a channel
    pub async fn get_channel_programs(&self, channel_id: &str) -> Result<Vec<Program>> {
        let key = format!("programs_{}", channel_id);
        self.programs
            .get_or_compute(&key, || async {
                info!("Fetching programs of {}", channel_id);
                let page: ProgramsResponse =
                    self.client.fetch(&self.client.programs_url(channel_id)).await?;

                let programs: Vec<Program> = page
                    .items
                    .iter()
                    .filter_map(decode_item)
                    .filter_map(|item| normalize_program(&item))
                    .collect();

                info!("{} programs found for {}", programs.len(), channel_id);
                Ok(programs)
            })
            .await
    }

    /// Videos matching `query`
    ///
    /// Only the collection labelled "Vidéos" is read; program and people
    /// collections of the same response are ignored.
    pub async fn search(&self, query: &str) -> Result<Vec<Video>> {
        let key = format!("search_{}", query);
        self.videos
            .get_or_compute(&key, || async {
                info!("Searching \"{}\"", query);
                let page: ChannelResponse =
                    self.client.fetch(&self.client.search_url(query)).await?;

                let videos: Vec<Video> = page
                    .collections
                    .iter()
                    .filter(|c| c.label.as_deref() == Some(SEARCH_VIDEOS_LABEL))
                    .flat_map(|c| c.items.iter())
                    .filter_map(decode_item)
                    .filter_map(|item| normalize_video(&item))
                    .collect();

                info!("{} results for \"{}\"", videos.len(), query);
                Ok(videos)
            })
            .await
    }

    /// Rugby videos, filtered by keyword from the sport channel
    pub async fn get_rugby_content(&self) -> Result<Vec<Video>> {
        self.videos
            .get_or_compute("rugby", || async {
                info!("Fetching rugby content");
                let page: ChannelResponse = self
                    .client
                    .fetch(&self.client.channel_url(SPORT_CHANNEL))
                    .await?;

                let videos = dedup_by_id(
                    page.collections
                        .iter()
                        .flat_map(|c| c.items.iter())
                        .filter_map(decode_item)
                        .filter(is_rugby)
                        .filter_map(|item| normalize_video(&item)),
                );

                info!("{} rugby videos found", videos.len());
                Ok(videos)
            })
            .await
    }

    // ========================================================================
    // Uncached lookups
    // ========================================================================

    /// Live stream of a channel
    ///
    /// `None` when the channel page has no live slot with an embedded video
    /// identifier, or when the page cannot be fetched.
    pub async fn get_live_stream(&self, channel_id: &str) -> Option<ResolvedStream> {
        info!("Fetching live of {}", channel_id);

        let page: ChannelResponse = match self.client.fetch(&self.client.channel_url(channel_id)).await
        {
            Ok(page) => page,
            Err(e) => {
                error!("Live lookup for {} failed: {}", channel_id, e);
                return None;
            }
        };

        let live_id = page
            .collections
            .iter()
            .filter(|c| c.kind.as_deref() == Some(LIVE_COLLECTION_TYPE))
            .find_map(|c| {
                let item = decode_item(c.items.first()?)?;
                item.channel?.si_id.filter(|id| !id.is_empty())
            });

        match live_id {
            Some(id) => self.streams.resolve(&id).await,
            None => {
                info!("No live slot for {}", channel_id);
                None
            }
        }
    }

    /// Playback information for a video (never cached)
    pub async fn resolve_stream(&self, video_id: &str) -> Option<ResolvedStream> {
        self.streams.resolve(video_id).await
    }
}

/// Case-insensitive keyword match on title (or label) and description
pub fn is_rugby(item: &RawItem) -> bool {
    let title = item.title_or_label().unwrap_or_default().to_lowercase();
    let description = item.description.as_deref().unwrap_or_default().to_lowercase();

    RUGBY_KEYWORDS
        .iter()
        .any(|kw| title.contains(kw) || description.contains(kw))
}

/// Drops videos whose id was already seen, keeping first-seen order
pub fn dedup_by_id(videos: impl IntoIterator<Item = Video>) -> Vec<Video> {
    let mut seen = HashSet::new();
    videos
        .into_iter()
        .filter(|v| seen.insert(v.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str) -> Video {
        Video {
            id: id.to_string(),
            title: format!("Video {}", id),
            description: None,
            duration_seconds: None,
            image_url: None,
            channel_label: None,
            content_type: None,
        }
    }

    fn raw(title: Option<&str>, label: Option<&str>, description: Option<&str>) -> RawItem {
        RawItem {
            title: title.map(String::from),
            label: label.map(String::from),
            description: description.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let ids: Vec<String> = dedup_by_id(["a", "b", "a", "c"].into_iter().map(video))
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_is_rugby() {
        assert!(is_rugby(&raw(Some("Top 14 Final"), None, None)));
        assert!(is_rugby(&raw(None, Some("Le CRUNCH"), None)));
        assert!(is_rugby(&raw(
            Some("Résumé"),
            None,
            Some("Le XV de France affronte les All Blacks")
        )));
        assert!(!is_rugby(&raw(Some("Evening News"), None, Some("Journal"))));
        assert!(!is_rugby(&raw(None, None, None)));
    }
}
