//! Extension pour intégrer France.tv dans pmoconfig
//!
//! Ce module fournit le trait `FranceTvConfigExt` qui ajoute à
//! `pmoconfig::Config` la lecture des réglages France.tv (URLs des APIs,
//! timeout HTTP, cache).
//!
//! ```yaml
//! sources:
//!   francetv:
//!     mobile_api_url: https://api-mobile.yatta.francetv.fr
//!     video_api_url: https://k7.ftven.fr/videos
//!     request_timeout_secs: 30
//!     cache:
//!       ttl_secs: 1800
//!       max_entries: 0   # 0 = unbounded
//! ```
//!
//! # Exemple
//!
//! ```no_run
//! use pmoconfig::get_config;
//! use pmofrancetv::{ContentResolver, FranceTvConfigExt};
//!
//! # fn main() -> pmofrancetv::Result<()> {
//! let config = get_config();
//! println!("Cache TTL: {:?}", config.get_francetv_cache_ttl());
//!
//! let resolver = ContentResolver::from_config(&config)?;
//! # Ok(())
//! # }
//! ```

use crate::cache::{TtlCache, DEFAULT_CACHE_TTL};
use crate::client::{
    FranceTvClient, DEFAULT_MOBILE_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_VIDEO_API_URL,
};
use crate::error::Result;
use crate::resolver::ContentResolver;
use pmoconfig::Config;
use std::time::Duration;
use tracing::info;

const SECTION: [&str; 2] = ["sources", "francetv"];

fn path<'a>(keys: &[&'a str]) -> Vec<&'a str> {
    let mut full: Vec<&'a str> = SECTION.to_vec();
    full.extend_from_slice(keys);
    full
}

/// Trait d'extension pour la configuration France.tv
///
/// Les getters ne renvoient jamais d'erreur : une valeur absente ou
/// invalide donne la valeur par défaut.
pub trait FranceTvConfigExt {
    /// Base URL of the mobile catalog API
    fn get_francetv_mobile_api_url(&self) -> String;

    /// Base URL of the video metadata API
    fn get_francetv_video_api_url(&self) -> String;

    /// Timeout applied to every upstream request
    fn get_francetv_request_timeout(&self) -> Duration;

    /// TTL of catalog entries (default 30 minutes)
    fn get_francetv_cache_ttl(&self) -> Duration;

    /// Maximum number of entries per cache, `None` when unbounded
    fn get_francetv_cache_max_entries(&self) -> Option<u64>;
}

impl FranceTvConfigExt for Config {
    fn get_francetv_mobile_api_url(&self) -> String {
        self.get_string_or(&path(&["mobile_api_url"]), DEFAULT_MOBILE_API_URL)
    }

    fn get_francetv_video_api_url(&self) -> String {
        self.get_string_or(&path(&["video_api_url"]), DEFAULT_VIDEO_API_URL)
    }

    fn get_francetv_request_timeout(&self) -> Duration {
        match self.get_u64_or(&path(&["request_timeout_secs"]), DEFAULT_REQUEST_TIMEOUT_SECS) {
            0 => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    fn get_francetv_cache_ttl(&self) -> Duration {
        match self.get_u64_or(&path(&["cache", "ttl_secs"]), DEFAULT_CACHE_TTL.as_secs()) {
            0 => DEFAULT_CACHE_TTL,
            secs => Duration::from_secs(secs),
        }
    }

    fn get_francetv_cache_max_entries(&self) -> Option<u64> {
        match self.get_u64_or(&path(&["cache", "max_entries"]), 0) {
            0 => None,
            n => Some(n),
        }
    }
}

impl FranceTvClient {
    /// Client configured from the `sources.francetv` section
    pub fn from_config(config: &Config) -> Result<Self> {
        FranceTvClient::builder()
            .mobile_api_url(config.get_francetv_mobile_api_url())
            .video_api_url(config.get_francetv_video_api_url())
            .timeout(config.get_francetv_request_timeout())
            .build()
    }
}

fn cache_from_config<V>(config: &Config) -> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    let ttl = config.get_francetv_cache_ttl();
    match config.get_francetv_cache_max_entries() {
        Some(max) => TtlCache::with_max_capacity(ttl, max),
        None => TtlCache::new(ttl),
    }
}

impl ContentResolver {
    /// Resolver whose client and caches follow the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = FranceTvClient::from_config(config)?;
        info!(
            mobile_api = client.mobile_api_url(),
            video_api = client.video_api_url(),
            ttl_secs = config.get_francetv_cache_ttl().as_secs(),
            "Creating France.tv resolver"
        );
        Ok(ContentResolver::with_caches(
            client,
            cache_from_config(config),
            cache_from_config(config),
        ))
    }
}
