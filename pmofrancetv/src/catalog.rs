//! Stremio add-on layer
//!
//! [`FranceTvAddon`] exposes the resolver through the add-on protocol:
//! a manifest plus catalog, meta and stream handlers. Handlers never fail;
//! resolver errors are logged and turned into empty answers.

use crate::models::{ResolvedStream, Video};
use crate::resolver::ContentResolver;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const ADDON_ID: &str = "community.stremio.francetv";
pub const ADDON_NAME: &str = "France.tv";
pub const ADDON_VERSION: &str = "1.0.0";
const ADDON_DESCRIPTION: &str =
    "Replay gratuit France Télévisions - France 2, France 3, France 4, France 5, franceinfo, Slash";
const ADDON_LOGO: &str = "https://www.france.tv/image/vignette_3x4/280/420/p/l/e/phpqlzple.png";
const ADDON_BACKGROUND: &str =
    "https://www.france.tv/image/background_16x9/2500/1400/j/k/s/phpn0qskj.jpg";

/// Prefix of every item id handed to the player
pub const ID_PREFIX: &str = "francetv:";

/// Prefix of catalog ids, stripped to get the channel id
pub const CATALOG_PREFIX: &str = "francetv-";

/// Page size of catalog responses
pub const PAGE_SIZE: usize = 50;

/// Queries merged into the default "Émissions TV" catalog
pub const POPULAR_QUERIES: &[&str] = &[
    "papotin",
    "quotidien",
    "grande librairie",
    "on est en direct",
    "c dans l'air",
];

/// Results kept per popular query
pub const POPULAR_RESULTS_PER_QUERY: usize = 10;

/// Fallback link for DRM-protected videos
pub const FRANCETV_WEBSITE: &str = "https://www.france.tv/";

// (type, id, name, accepts search)
const CATALOGS: &[(&str, &str, &str, bool)] = &[
    ("movie", "francetv-france-2", "France 2", false),
    ("movie", "francetv-france-3", "France 3", false),
    ("movie", "francetv-france-5", "France 5", false),
    ("movie", "francetv-france-4", "France 4", false),
    ("movie", "francetv-franceinfo", "franceinfo", false),
    ("movie", "francetv-slash", "France tv Slash", false),
    ("movie", "francetv-sport", "⚽ Sport", false),
    ("series", "francetv-series-et-fictions", "📺 Séries & Fictions", false),
    ("movie", "francetv-rugby", "🏉 Rugby", false),
    ("movie", "francetv-papotin", "🎤 Le Papotin", false),
    ("movie", "francetv-emissions", "📻 Émissions TV", true),
];

// ============================================================================
// Protocol types
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub background: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub catalogs: Vec<CatalogDescriptor>,
    pub id_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogDescriptor {
    #[serde(rename = "type")]
    pub content_type: String,
    pub id: String,
    pub name: String,
    pub extra: Vec<ExtraDescriptor>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtraDescriptor {
    pub name: String,
    pub is_required: bool,
}

impl ExtraDescriptor {
    fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_required: false,
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetaPreview {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub poster_shape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Detailed item
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetaDetail {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub poster_shape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub runtime: String,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior_hints: Option<BehaviorHints>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub not_web_ready: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CatalogResponse {
    pub metas: Vec<MetaPreview>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MetaResponse {
    pub meta: Option<MetaDetail>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StreamResponse {
    pub streams: Vec<Stream>,
}

/// Extra catalog arguments (`skip=50&search=foo`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogExtra {
    pub skip: usize,
    pub search: Option<String>,
}

impl CatalogExtra {
    /// Parses the extra path segment
    ///
    /// Unknown keys are ignored, an unparsable `skip` counts as 0 and an
    /// empty `search` as no search.
    ///
    /// The router hands over an already percent-decoded segment, so a
    /// literal `&` inside a search term splits it: `search=Tom & Jerry`
    /// searches for `"Tom "`. Stremio clients get the same cut from the
    /// reference add-on SDK.
    pub fn parse(segment: &str) -> Self {
        let mut extra = Self::default();

        for pair in segment.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());

            match key {
                "skip" => extra.skip = value.trim().parse().unwrap_or(0),
                "search" if !value.trim().is_empty() => extra.search = Some(value),
                _ => {}
            }
        }

        extra
    }
}

// ============================================================================
// Add-on
// ============================================================================

/// The France.tv add-on
#[derive(Clone)]
pub struct FranceTvAddon {
    resolver: Arc<ContentResolver>,
}

impl FranceTvAddon {
    pub fn new(resolver: Arc<ContentResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ContentResolver {
        &self.resolver
    }

    pub fn manifest(&self) -> Manifest {
        let catalogs = CATALOGS
            .iter()
            .map(|(content_type, id, name, searchable)| {
                let mut extra = vec![ExtraDescriptor::optional("skip")];
                if *searchable {
                    extra.push(ExtraDescriptor::optional("search"));
                }
                CatalogDescriptor {
                    content_type: content_type.to_string(),
                    id: id.to_string(),
                    name: name.to_string(),
                    extra,
                }
            })
            .collect();

        Manifest {
            id: ADDON_ID.to_string(),
            version: ADDON_VERSION.to_string(),
            name: ADDON_NAME.to_string(),
            description: ADDON_DESCRIPTION.to_string(),
            logo: ADDON_LOGO.to_string(),
            background: ADDON_BACKGROUND.to_string(),
            resources: vec!["catalog".into(), "meta".into(), "stream".into()],
            types: vec!["movie".into(), "series".into(), "tv".into()],
            catalogs,
            id_prefixes: vec![ID_PREFIX.to_string()],
        }
    }

    /// Catalog handler
    pub async fn catalog(
        &self,
        content_type: &str,
        catalog_id: &str,
        extra: &CatalogExtra,
    ) -> CatalogResponse {
        info!("Catalog requested: {} (type: {})", catalog_id, content_type);

        let videos = match self.catalog_videos(catalog_id, extra).await {
            Ok(videos) => videos,
            Err(e) => {
                error!("Catalog {} failed: {}", catalog_id, e);
                return CatalogResponse::default();
            }
        };

        let metas: Vec<MetaPreview> = videos
            .into_iter()
            .skip(extra.skip)
            .take(PAGE_SIZE)
            .map(|video| meta_preview(video, content_type))
            .collect();

        info!("Returning {} results (skip: {})", metas.len(), extra.skip);
        CatalogResponse { metas }
    }

    async fn catalog_videos(
        &self,
        catalog_id: &str,
        extra: &CatalogExtra,
    ) -> crate::Result<Vec<Video>> {
        let channel_id = catalog_id.strip_prefix(CATALOG_PREFIX).unwrap_or(catalog_id);

        match channel_id {
            "rugby" => self.resolver.get_rugby_content().await,
            "papotin" => self.resolver.search("papotin").await,
            "emissions" => match extra.search.as_deref() {
                Some(query) => self.resolver.search(query).await,
                None => Ok(self.popular_videos().await),
            },
            _ => self.resolver.get_channel_content(channel_id).await,
        }
    }

    /// Head of each popular query, in query order
    async fn popular_videos(&self) -> Vec<Video> {
        let mut videos = Vec::new();
        for query in POPULAR_QUERIES {
            match self.resolver.search(query).await {
                Ok(results) => {
                    videos.extend(results.into_iter().take(POPULAR_RESULTS_PER_QUERY))
                }
                Err(e) => warn!("Popular query \"{}\" skipped: {}", query, e),
            }
        }
        videos
    }

    /// Meta handler
    pub async fn meta(&self, content_type: &str, id: &str) -> MetaResponse {
        info!("Meta requested: {} (type: {})", id, content_type);

        let meta = self
            .resolver
            .resolve_stream(strip_id_prefix(id))
            .await
            .map(|stream| MetaDetail {
                id: id.to_string(),
                content_type: content_type.to_string(),
                runtime: format_runtime(stream.duration_seconds.unwrap_or(0)),
                name: stream.title,
                poster: stream.image_url.clone(),
                poster_shape: "landscape".to_string(),
                background: stream.image_url,
                description: stream.description,
                genres: vec![ADDON_NAME.to_string(), "Replay".to_string()],
            });

        MetaResponse { meta }
    }

    /// Stream handler
    pub async fn streams(&self, content_type: &str, id: &str) -> StreamResponse {
        info!("Stream requested: {} (type: {})", id, content_type);

        let video_id = strip_id_prefix(id);
        match self.resolver.resolve_stream(video_id).await {
            Some(stream) => StreamResponse {
                streams: to_streams(stream),
            },
            None => {
                info!("No stream for {}", video_id);
                StreamResponse::default()
            }
        }
    }
}

fn strip_id_prefix(id: &str) -> &str {
    id.strip_prefix(ID_PREFIX).unwrap_or(id)
}

fn meta_preview(video: Video, content_type: &str) -> MetaPreview {
    MetaPreview {
        id: format!("{}{}", ID_PREFIX, video.id),
        content_type: content_type.to_string(),
        name: video.title,
        poster: video.image_url.clone(),
        poster_shape: "landscape".to_string(),
        description: video.description,
        background: video.image_url,
    }
}

fn to_streams(stream: ResolvedStream) -> Vec<Stream> {
    if stream.is_drm_protected {
        return vec![Stream {
            name: ADDON_NAME.to_string(),
            title: format!("{}\n⚠️ Protégé par DRM - Non disponible", stream.title),
            url: None,
            external_url: Some(FRANCETV_WEBSITE.to_string()),
            behavior_hints: None,
        }];
    }

    match stream.playback_url {
        Some(url) => vec![Stream {
            name: ADDON_NAME.to_string(),
            title: format!("{}\n🇫🇷 Français", stream.title),
            url: Some(url),
            external_url: None,
            behavior_hints: Some(BehaviorHints {
                not_web_ready: false,
            }),
        }],
        None => Vec::new(),
    }
}

/// `"{h}h{m}min"`, or `"{m}min"` under one hour
pub fn format_runtime(duration_seconds: u64) -> String {
    let hours = duration_seconds / 3600;
    let minutes = (duration_seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h{}min", hours, minutes)
    } else {
        format!("{}min", minutes)
    }
}
