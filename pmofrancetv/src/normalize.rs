//! Normalization of upstream items into [`Video`] and [`Program`]
//!
//! Pure functions, no I/O. Items without a usable identifier are rejected
//! (`None`) rather than turned into partial records.

use crate::models::{Program, RawImage, RawItem, Video};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Image variant used for video posters
pub const VIDEO_IMAGE_TYPE: &str = "vignette_16x9";
/// Preferred widths for video posters, best first
pub const VIDEO_IMAGE_WIDTHS: &[&str] = &["w:1024", "w:800"];

/// Image variant used for program posters
pub const PROGRAM_IMAGE_TYPE: &str = "vignette_3x4";
/// Preferred widths for program posters, best first
pub const PROGRAM_IMAGE_WIDTHS: &[&str] = &["w:400", "w:800"];

/// Decodes one raw JSON item
///
/// Only a value that is not an item at all (a string, a number) is logged
/// and skipped; odd fields inside an item read as absent. It never fails
/// the whole listing.
pub fn decode_item(value: &Value) -> Option<RawItem> {
    match RawItem::deserialize(value) {
        Ok(item) => Some(item),
        Err(e) => {
            warn!("Skipping undecodable item: {}", e);
            None
        }
    }
}

/// Builds a [`Video`] from a catalog item
///
/// Returns `None` when the item has no `si_id`.
pub fn normalize_video(item: &RawItem) -> Option<Video> {
    let id = non_empty(item.si_id.as_deref())?;

    Some(Video {
        id: id.to_string(),
        title: item.title_or_label().unwrap_or_default().to_string(),
        description: item.description.clone(),
        duration_seconds: item.duration,
        image_url: select_image(&item.images, VIDEO_IMAGE_TYPE, VIDEO_IMAGE_WIDTHS),
        channel_label: item.channel.as_ref().and_then(|c| c.label.clone()),
        content_type: item.kind.clone(),
    })
}

/// Builds a [`Program`] from a program listing item
///
/// Returns `None` when the item has no `program_path`.
pub fn normalize_program(item: &RawItem) -> Option<Program> {
    let id = non_empty(item.program_path.as_deref())?;

    Some(Program {
        id: id.to_string(),
        title: item.label_or_title().unwrap_or_default().to_string(),
        description: item.description.clone(),
        image_url: select_image(&item.images, PROGRAM_IMAGE_TYPE, PROGRAM_IMAGE_WIDTHS),
    })
}

/// Picks a rendition in the first variant of type `kind` that carries URLs
///
/// Later variants of the same type are not considered, even when the first
/// one lacks every preferred width.
pub fn select_image(images: &[RawImage], kind: &str, widths: &[&str]) -> Option<String> {
    let urls = images
        .iter()
        .filter(|img| img.kind.as_deref() == Some(kind))
        .find_map(|img| img.urls.as_ref())?;

    widths
        .iter()
        .find_map(|w| urls.get(*w).filter(|u| !u.is_empty()).cloned())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> RawItem {
        decode_item(&value).expect("decodable item")
    }

    #[test]
    fn test_video_requires_identifier() {
        assert!(normalize_video(&item(json!({ "title": "Sans id" }))).is_none());
        assert!(normalize_video(&item(json!({ "si_id": "", "title": "Vide" }))).is_none());
    }

    #[test]
    fn test_video_fields() {
        let video = normalize_video(&item(json!({
            "si_id": "abc-123",
            "label": "Envoyé spécial",
            "description": "Magazine",
            "duration": 3120,
            "type": "integrale",
            "channel": { "label": "France 2" },
            "images": [
                { "type": "vignette_3x4", "urls": { "w:400": "https://img/3x4-400.jpg" } },
                { "type": "vignette_16x9", "urls": {
                    "w:800": "https://img/16x9-800.jpg",
                    "w:1024": "https://img/16x9-1024.jpg"
                } }
            ]
        })))
        .unwrap();

        assert_eq!(video.id, "abc-123");
        assert_eq!(video.title, "Envoyé spécial");
        assert_eq!(video.description.as_deref(), Some("Magazine"));
        assert_eq!(video.duration_seconds, Some(3120));
        assert_eq!(video.image_url.as_deref(), Some("https://img/16x9-1024.jpg"));
        assert_eq!(video.channel_label.as_deref(), Some("France 2"));
        assert_eq!(video.content_type.as_deref(), Some("integrale"));
    }

    #[test]
    fn test_title_wins_over_label() {
        let video = normalize_video(&item(json!({
            "si_id": "x", "title": "Titre", "label": "Label"
        })))
        .unwrap();
        assert_eq!(video.title, "Titre");
    }

    #[test]
    fn test_video_image_falls_back_to_800() {
        let video = normalize_video(&item(json!({
            "si_id": "x",
            "images": [ { "type": "vignette_16x9", "urls": { "w:800": "https://img/800.jpg" } } ]
        })))
        .unwrap();
        assert_eq!(video.image_url.as_deref(), Some("https://img/800.jpg"));
    }

    #[test]
    fn test_video_image_absent_without_variant() {
        let video = normalize_video(&item(json!({
            "si_id": "x",
            "images": [ { "type": "background_16x9", "urls": { "w:1024": "https://img/bg.jpg" } } ]
        })))
        .unwrap();
        assert_eq!(video.image_url, None);
    }

    #[test]
    fn test_program_fields() {
        let program = normalize_program(&item(json!({
            "program_path": "france-5/c-dans-l-air",
            "label": "C dans l'air",
            "title": "ignored",
            "images": [ { "type": "vignette_3x4", "urls": {
                "w:800": "https://img/800.jpg",
                "w:400": "https://img/400.jpg"
            } } ]
        })))
        .unwrap();

        assert_eq!(program.id, "france-5/c-dans-l-air");
        assert_eq!(program.title, "C dans l'air");
        assert_eq!(program.image_url.as_deref(), Some("https://img/400.jpg"));
    }

    #[test]
    fn test_program_requires_path() {
        assert!(normalize_program(&item(json!({ "si_id": "x", "label": "No path" }))).is_none());
    }

    #[test]
    fn test_decode_item_rejects_non_objects() {
        assert!(decode_item(&json!("not an object")).is_none());
        assert!(decode_item(&json!(42)).is_none());
    }

    #[test]
    fn test_odd_fields_keep_the_video() {
        let fractional = normalize_video(&item(json!({ "si_id": "a", "duration": 2760.0 }))).unwrap();
        let negative = normalize_video(&item(json!({ "si_id": "c", "duration": -1 }))).unwrap();
        let wordy = normalize_video(&item(json!({ "si_id": "d", "duration": "long" }))).unwrap();
        let null_rendition = normalize_video(&item(json!({
            "si_id": "b",
            "images": [ { "type": "vignette_16x9", "urls": { "w:1024": "https://x", "w:400": null } } ]
        })))
        .unwrap();

        assert_eq!(fractional.duration_seconds, Some(2760));
        assert_eq!(negative.duration_seconds, None);
        assert_eq!(wordy.id, "d");
        assert_eq!(null_rendition.image_url.as_deref(), Some("https://x"));
    }
}
