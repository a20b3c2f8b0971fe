//! Integration tests for stream and live resolution

use pmofrancetv::{ContentResolver, FranceTvClient, StreamResolver, TokenExchange};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE_URL: &str = "https://cdn.example/hls/master.m3u8?v=1";
const SIGNED_URL: &str = "https://cdn.example/hls/master.m3u8?v=1&hdnts=signed";

fn client_for(server: &MockServer) -> FranceTvClient {
    FranceTvClient::builder()
        .mobile_api_url(server.uri())
        .video_api_url(format!("{}/videos", server.uri()))
        .build()
        .unwrap()
}

fn meta() -> Value {
    json!({
        "title": "Envoyé spécial",
        "description": "Magazine d'information",
        "image_url": "https://img/es.jpg"
    })
}

async fn mount_video(server: &MockServer, id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/videos/{}", id)))
        .and(query_param("country_code", "FR"))
        .and(query_param("domain", "www.france.tv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn token_endpoint(server: &MockServer) -> String {
    format!("{}/esi/TA?format=json", server.uri())
}

#[tokio::test]
async fn test_playable_video_without_token() {
    let server = MockServer::start().await;
    mount_video(
        &server,
        "v1",
        json!({
            "video": { "url": BASE_URL, "format": "hls", "duration": 3120, "drm": false },
            "meta": meta()
        }),
    )
    .await;

    let resolver = StreamResolver::new(client_for(&server));
    let stream = resolver.resolve("v1").await.unwrap();

    assert_eq!(stream.video_id, "v1");
    assert_eq!(stream.title, "Envoyé spécial");
    assert_eq!(stream.description.as_deref(), Some("Magazine d'information"));
    assert_eq!(stream.image_url.as_deref(), Some("https://img/es.jpg"));
    assert_eq!(stream.duration_seconds, Some(3120));
    assert!(!stream.is_drm_protected);
    assert_eq!(stream.playback_url.as_deref(), Some(BASE_URL));
    assert_eq!(stream.delivery_format.as_deref(), Some("hls"));
}

#[tokio::test]
async fn test_fractional_duration_keeps_video_playable() {
    let server = MockServer::start().await;
    mount_video(
        &server,
        "f",
        json!({
            "video": { "url": "https://cdn/f.m3u8", "duration": 3120.5, "format": null },
            "meta": { "title": "Film", "description": 12 }
        }),
    )
    .await;

    let stream = StreamResolver::new(client_for(&server))
        .resolve("f")
        .await
        .unwrap();

    assert_eq!(stream.playback_url.as_deref(), Some("https://cdn/f.m3u8"));
    assert_eq!(stream.duration_seconds, Some(3121));
    assert_eq!(stream.title, "Film");
    assert_eq!(stream.description, None);
}

#[tokio::test]
async fn test_drm_video_has_no_playback_url() {
    let server = MockServer::start().await;
    mount_video(
        &server,
        "drm1",
        json!({
            "video": { "url": BASE_URL, "drm": true, "duration": 5400,
                       "token": { "akamai": token_endpoint(&server) } },
            "meta": meta()
        }),
    )
    .await;

    // the token endpoint must not be called for DRM content
    Mock::given(method("GET"))
        .and(path("/esi/TA"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = StreamResolver::new(client_for(&server));
    let stream = resolver.resolve("drm1").await.unwrap();

    assert!(stream.is_drm_protected);
    assert_eq!(stream.playback_url, None);
    assert_eq!(stream.title, "Envoyé spécial");
    assert_eq!(stream.duration_seconds, Some(5400));
}

#[tokio::test]
async fn test_token_exchange_replaces_url() {
    let server = MockServer::start().await;
    mount_video(
        &server,
        "v2",
        json!({
            "video": { "url": BASE_URL, "format": "hls",
                       "token": { "akamai": token_endpoint(&server) } },
            "meta": meta()
        }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/esi/TA"))
        .and(query_param("format", "json"))
        .and(query_param("url", BASE_URL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": SIGNED_URL })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = StreamResolver::new(client_for(&server));
    let stream = resolver.resolve("v2").await.unwrap();

    assert_eq!(stream.playback_url.as_deref(), Some(SIGNED_URL));
}

#[tokio::test]
async fn test_token_failure_keeps_base_url() {
    let server = MockServer::start().await;
    mount_video(
        &server,
        "v3",
        json!({
            "video": { "url": BASE_URL, "token": { "akamai": token_endpoint(&server) } },
            "meta": meta()
        }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/esi/TA"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let resolver = StreamResolver::new(client_for(&server));
    let stream = resolver.resolve("v3").await.unwrap();

    assert!(!stream.is_drm_protected);
    assert_eq!(stream.playback_url.as_deref(), Some(BASE_URL));
}

#[tokio::test]
async fn test_exchange_token_outcomes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esi/TA"))
        .and(query_param("url", "https://cdn/ok.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": SIGNED_URL })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/esi/TA"))
        .and(query_param("url", "https://cdn/empty.m3u8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/esi/TA"))
        .and(query_param("url", "https://cdn/broken.m3u8"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let resolver = StreamResolver::new(client_for(&server));
    let endpoint = token_endpoint(&server);

    assert!(matches!(
        resolver.exchange_token(&endpoint, "https://cdn/ok.m3u8").await,
        TokenExchange::Exchanged(url) if url == SIGNED_URL
    ));
    assert!(matches!(
        resolver.exchange_token(&endpoint, "https://cdn/empty.m3u8").await,
        TokenExchange::Unchanged
    ));
    assert!(matches!(
        resolver.exchange_token(&endpoint, "https://cdn/broken.m3u8").await,
        TokenExchange::Failed(e) if e.status() == Some(reqwest::StatusCode::BAD_GATEWAY)
    ));
}

#[tokio::test]
async fn test_missing_payload_resolves_to_none() {
    let server = MockServer::start().await;
    mount_video(&server, "gone", json!({ "meta": meta() })).await;
    mount_video(&server, "nourl", json!({ "video": { "drm": false }, "meta": meta() })).await;

    let resolver = StreamResolver::new(client_for(&server));

    assert!(resolver.resolve("gone").await.is_none());
    assert!(resolver.resolve("nourl").await.is_none());
}

#[tokio::test]
async fn test_fetch_failure_resolves_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/unknown"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resolver = StreamResolver::new(client_for(&server));
    assert!(resolver.resolve("unknown").await.is_none());
}

#[tokio::test]
async fn test_streams_are_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos/v4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video": { "url": BASE_URL }, "meta": meta()
        })))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = ContentResolver::new(client_for(&server));
    assert!(resolver.resolve_stream("v4").await.is_some());
    assert!(resolver.resolve_stream("v4").await.is_some());
}

#[tokio::test]
async fn test_live_stream_uses_live_slot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apps/channels/france-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collections": [
                { "label": "Replay", "type": "mixed", "items": [
                    { "si_id": "replay-1", "channel": { "si_id": "not-live" } }
                ] },
                { "label": "En direct", "type": "live", "items": [
                    { "title": "France 2 en direct", "channel": { "label": "France 2", "si_id": "live-f2" } }
                ] }
            ]
        })))
        .mount(&server)
        .await;
    mount_video(
        &server,
        "live-f2",
        json!({ "video": { "url": BASE_URL, "format": "hls" }, "meta": { "title": "France 2" } }),
    )
    .await;

    let resolver = ContentResolver::new(client_for(&server));
    let live = resolver.get_live_stream("france-2").await.unwrap();

    assert_eq!(live.video_id, "live-f2");
    assert_eq!(live.title, "France 2");
    assert_eq!(live.playback_url.as_deref(), Some(BASE_URL));
}

#[tokio::test]
async fn test_live_stream_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apps/channels/france-4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collections": [
                { "type": "live", "items": [] },
                { "type": "live", "items": [ { "title": "Sans chaîne" } ] }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apps/channels/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let resolver = ContentResolver::new(client_for(&server));

    assert!(resolver.get_live_stream("france-4").await.is_none());
    assert!(resolver.get_live_stream("broken").await.is_none());
}
