//! Endpoints HTTP de l'add-on France.tv
//!
//! Routes follow the Stremio add-on layout. Every resource path ends in
//! `.json`; the suffix is stripped from the last segment by the handlers
//! since path parameters cannot carry a static suffix.

use crate::catalog::{
    CatalogExtra, CatalogResponse, FranceTvAddon, Manifest, MetaResponse, StreamResponse,
    ADDON_NAME, ADDON_VERSION,
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderName, Method},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub addon: &'static str,
    pub version: &'static str,
}

/// Crée le router de l'add-on
pub fn create_router(addon: FranceTvAddon) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]);

    Router::new()
        .route("/health", get(health))
        .route("/manifest.json", get(manifest))
        .route("/catalog/{type}/{id}", get(catalog))
        .route("/catalog/{type}/{id}/{extra}", get(catalog_with_extra))
        .route("/meta/{type}/{id}", get(meta))
        .route("/stream/{type}/{id}", get(stream))
        .layer(cors)
        .with_state(addon)
}

fn strip_json(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        addon: ADDON_NAME,
        version: ADDON_VERSION,
    })
}

/// GET /manifest.json
async fn manifest(State(addon): State<FranceTvAddon>) -> Json<Manifest> {
    Json(addon.manifest())
}

/// GET /catalog/{type}/{id}.json
async fn catalog(
    State(addon): State<FranceTvAddon>,
    Path((content_type, id)): Path<(String, String)>,
) -> Json<CatalogResponse> {
    Json(
        addon
            .catalog(&content_type, strip_json(&id), &CatalogExtra::default())
            .await,
    )
}

/// GET /catalog/{type}/{id}/{extra}.json
async fn catalog_with_extra(
    State(addon): State<FranceTvAddon>,
    Path((content_type, id, extra)): Path<(String, String, String)>,
) -> Json<CatalogResponse> {
    let extra = CatalogExtra::parse(strip_json(&extra));
    Json(addon.catalog(&content_type, &id, &extra).await)
}

/// GET /meta/{type}/{id}.json
async fn meta(
    State(addon): State<FranceTvAddon>,
    Path((content_type, id)): Path<(String, String)>,
) -> Json<MetaResponse> {
    Json(addon.meta(&content_type, strip_json(&id)).await)
}

/// GET /stream/{type}/{id}.json
async fn stream(
    State(addon): State<FranceTvAddon>,
    Path((content_type, id)): Path<(String, String)>,
) -> Json<StreamResponse> {
    Json(addon.streams(&content_type, strip_json(&id)).await)
}
