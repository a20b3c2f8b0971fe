//! France.tv client library for PMOTv
//!
//! This crate resolves the France Télévisions replay catalog and its video
//! streams, and exposes them as a Stremio add-on.
//!
//! # Features
//!
//! - **Catalog**: channel pages, channel programs, search, rugby selection
//! - **Streams**: DRM detection and token exchange for playable URLs
//! - **Caching**: per-query TTL cache (30 minutes by default) with
//!   in-flight request coalescing
//! - **Add-on**: manifest, catalog/meta/stream handlers and axum routes
//!   (feature `server`)
//! - **Configuration Extension**: API URLs, timeout and cache settings from
//!   pmoconfig (feature `pmoconfig`)
//!
//! # Example
//!
//! ```no_run
//! use pmofrancetv::{ContentResolver, FranceTvClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = ContentResolver::new(FranceTvClient::new()?);
//!
//!     let videos = resolver.get_channel_content("france-2").await?;
//!     println!("Found {} videos", videos.len());
//!
//!     if let Some(video) = videos.first() {
//!         match resolver.resolve_stream(&video.id).await {
//!             Some(s) if s.is_drm_protected => println!("{} is DRM protected", s.title),
//!             Some(s) => println!("Stream: {:?}", s.playback_url),
//!             None => println!("No stream available"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Catalog queries return [`Result`]; a failed fetch is never cached, so the
//! next call retries upstream. Stream and live lookups return `Option`:
//! `None` covers both "nothing to play" and fetch failures, which are
//! logged.

pub mod cache;
pub mod catalog;
pub mod client;
pub mod error;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod stream;

#[cfg(feature = "pmoconfig")]
pub mod config_ext;

#[cfg(feature = "server")]
pub mod api_rest;

// Re-exports
pub use cache::{TtlCache, DEFAULT_CACHE_TTL};
pub use catalog::{CatalogExtra, FranceTvAddon, Manifest};
pub use client::{ClientBuilder, FranceTvClient};
pub use error::{Error, Result};
pub use models::{Program, ResolvedStream, StreamDetails, Video};
pub use resolver::ContentResolver;
pub use stream::{StreamResolver, TokenExchange};

#[cfg(feature = "pmoconfig")]
pub use config_ext::FranceTvConfigExt;

#[cfg(feature = "server")]
pub use api_rest::create_router;
