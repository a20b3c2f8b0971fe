//! Data models for France.tv API responses
//!
//! The public records ([`Video`], [`Program`], [`ResolvedStream`]) are what
//! the resolvers hand out. The `Raw*` structures mirror the upstream JSON
//! closely enough to deserialize it; every field is optional because the
//! mobile API mixes several item shapes inside the same collection.
//!
//! Decoding is lenient: a field with an unexpected shape reads as absent
//! instead of failing the record, so only a missing identifier can make an
//! item unusable.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Normalized records
// ============================================================================

/// A replay video, normalized from a catalog or search item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Video {
    /// Upstream stable identifier (`si_id`), never empty
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: Option<u64>,
    /// 16:9 vignette
    pub image_url: Option<String>,
    pub channel_label: Option<String>,
    /// Upstream item type tag (e.g. "integrale", "extrait")
    pub content_type: Option<String>,
}

/// A program (show) of a channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Program {
    /// Program path (e.g. "france-2/envoye-special")
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// 3:4 vignette
    pub image_url: Option<String>,
}

/// Playback information for one video
///
/// Either DRM-protected (and then without playback URL) or playable with a
/// URL. Build it through [`ResolvedStream::drm_protected`] or
/// [`ResolvedStream::playable`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolvedStream {
    pub video_id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: Option<u64>,
    pub image_url: Option<String>,
    pub is_drm_protected: bool,
    pub playback_url: Option<String>,
    /// Delivery format announced upstream (e.g. "hls", "dash")
    pub delivery_format: Option<String>,
}

impl ResolvedStream {
    /// Stream that cannot be played without a DRM-enabled player
    pub fn drm_protected(video_id: impl Into<String>, info: StreamDetails) -> Self {
        Self {
            video_id: video_id.into(),
            title: info.title,
            description: info.description,
            duration_seconds: info.duration_seconds,
            image_url: info.image_url,
            is_drm_protected: true,
            playback_url: None,
            delivery_format: None,
        }
    }

    /// Directly playable stream
    pub fn playable(
        video_id: impl Into<String>,
        info: StreamDetails,
        playback_url: impl Into<String>,
        delivery_format: Option<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: info.title,
            description: info.description,
            duration_seconds: info.duration_seconds,
            image_url: info.image_url,
            is_drm_protected: false,
            playback_url: Some(playback_url.into()),
            delivery_format,
        }
    }
}

/// Descriptive part of a [`ResolvedStream`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDetails {
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: Option<u64>,
    pub image_url: Option<String>,
}

// ============================================================================
// Mobile API (api-mobile.yatta.francetv.fr)
// ============================================================================

/// Response of `/apps/channels/{id}` and `/apps/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub collections: Vec<RawCollection>,
}

/// A collection (row) of a channel page or of search results
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCollection {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    /// Items are kept undecoded so that one odd item cannot fail the page
    #[serde(default, deserialize_with = "lenient_seq")]
    pub items: Vec<Value>,
}

/// Response of `/apps/regions/{id}/programs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramsResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub items: Vec<Value>,
}

/// A catalog item (video, program, live slot…)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub si_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub program_path: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "seconds")]
    pub duration: Option<u64>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub channel: Option<RawChannel>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub images: Vec<RawImage>,
}

impl RawItem {
    /// `title`, or `label` when the title is missing
    pub fn title_or_label(&self) -> Option<&str> {
        self.title.as_deref().or(self.label.as_deref())
    }

    /// `label`, or `title` when the label is missing
    pub fn label_or_title(&self) -> Option<&str> {
        self.label.as_deref().or(self.title.as_deref())
    }
}

/// Channel reference embedded in an item
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChannel {
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub si_id: Option<String>,
}

/// One image variant (`vignette_16x9`, `vignette_3x4`, `background_16x9`…)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    /// Renditions keyed by width, e.g. `"w:1024"`; null renditions are dropped
    #[serde(default, deserialize_with = "string_map")]
    pub urls: Option<HashMap<String, String>>,
}

// ============================================================================
// Video API (k7.ftven.fr)
// ============================================================================

/// Response of `/videos/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub video: Option<VideoPayload>,
    #[serde(default, deserialize_with = "lenient")]
    pub meta: Option<VideoMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub drm: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "seconds")]
    pub duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub token: Option<TokenRef>,
}

impl VideoPayload {
    pub fn is_drm(&self) -> bool {
        self.drm == Some(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoMeta {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
}

/// Token-exchange endpoints announced with a video
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRef {
    #[serde(default, deserialize_with = "lenient")]
    pub akamai: Option<String>,
}

/// Response of the token-exchange endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

// ============================================================================
// Deserialization helpers
// ============================================================================

/// Field of the expected shape, `None` for anything else
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| serde_json::from_value(v).ok()))
}

/// Array whose elements are decoded one by one; odd elements are dropped
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Durations in seconds: fractional values are rounded, negative ones dropped
fn seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(secs) => return Ok(Some(secs)),
            None => n.as_f64(),
        },
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(raw
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.round() as u64))
}

fn string_map<'de, D>(deserializer: D) -> Result<Option<HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Some(
            map.into_iter()
                .filter_map(|(key, value)| match value {
                    Value::String(url) => Some((key, url)),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Identifiers are strings upstream, but a few endpoints send them as numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_item_accepts_numeric_ids_and_nulls() {
        let item: RawItem = serde_json::from_value(json!({
            "si_id": 1234,
            "title": null,
            "label": "Journal",
            "images": null,
            "channel": { "label": "France 2", "si_id": "006194ea" }
        }))
        .unwrap();

        assert_eq!(item.si_id.as_deref(), Some("1234"));
        assert_eq!(item.title_or_label(), Some("Journal"));
        assert!(item.images.is_empty());
        assert_eq!(
            item.channel.and_then(|c| c.si_id).as_deref(),
            Some("006194ea")
        );
    }

    #[test]
    fn test_collection_without_items() {
        let page: ChannelResponse = serde_json::from_value(json!({
            "collections": [ { "label": "Vidéos", "type": "mixed" }, { "items": null } ]
        }))
        .unwrap();

        assert_eq!(page.collections.len(), 2);
        assert!(page.collections.iter().all(|c| c.items.is_empty()));
        assert_eq!(page.collections[0].kind.as_deref(), Some("mixed"));
    }

    #[test]
    fn test_video_payload_drm_flag() {
        let strict: VideoPayload = serde_json::from_value(json!({ "drm": true })).unwrap();
        let absent: VideoPayload = serde_json::from_value(json!({})).unwrap();

        assert!(strict.is_drm());
        assert!(!absent.is_drm());
    }

    #[test]
    fn test_incidental_fields_never_drop_an_item() {
        let float: RawItem =
            serde_json::from_value(json!({ "si_id": "a", "duration": 2760.4 })).unwrap();
        let negative: RawItem =
            serde_json::from_value(json!({ "si_id": "b", "duration": -1, "title": 42 })).unwrap();
        let text: RawItem =
            serde_json::from_value(json!({ "si_id": "c", "duration": "90", "channel": "france-2" }))
                .unwrap();

        assert_eq!(float.duration, Some(2760));
        assert_eq!(negative.duration, None);
        assert_eq!(negative.title, None);
        assert_eq!(text.duration, Some(90));
        assert!(text.channel.is_none());
    }

    #[test]
    fn test_image_urls_skip_null_renditions() {
        let item: RawItem = serde_json::from_value(json!({
            "si_id": "b",
            "images": [
                { "type": "vignette_16x9", "urls": { "w:1024": "https://x", "w:400": null } },
                "not an image"
            ]
        }))
        .unwrap();

        assert_eq!(item.images.len(), 1);
        let urls = item.images[0].urls.as_ref().unwrap();
        assert_eq!(urls.get("w:1024").map(String::as_str), Some("https://x"));
        assert!(!urls.contains_key("w:400"));
    }

    #[test]
    fn test_video_response_with_fractional_duration() {
        let response: VideoResponse = serde_json::from_value(json!({
            "video": { "url": "https://cdn/f.m3u8", "duration": 3120.5, "drm": null },
            "meta": { "title": "Film", "image_url": false }
        }))
        .unwrap();

        let video = response.video.unwrap();
        assert_eq!(video.url.as_deref(), Some("https://cdn/f.m3u8"));
        assert_eq!(video.duration, Some(3121));
        assert!(!video.is_drm());
        assert_eq!(response.meta.unwrap().image_url, None);
    }
}
