//! Gateway backed by the Discogs and Last.fm APIs.

use super::discogs::DiscogsClient;
use super::gateway::{AlbumLinks, EnrichmentGateway};
use super::lastfm::LastFmClient;
use crate::config::EnrichmentSettings;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

pub struct ProviderGateway {
    discogs: Option<DiscogsClient>,
    lastfm: Option<LastFmClient>,
    timeout: Duration,
}

impl ProviderGateway {
    pub fn new(
        discogs: Option<DiscogsClient>,
        lastfm: Option<LastFmClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            discogs,
            lastfm,
            timeout,
        }
    }

    /// Build the clients for every provider that has credentials.
    pub fn from_settings(settings: &EnrichmentSettings) -> Result<Self> {
        let discogs = match settings.discogs_credentials() {
            Some((key, secret)) => Some(DiscogsClient::new(
                key,
                secret,
                &settings.user_agent,
                settings.timeout,
            )?),
            None => {
                warn!("Discogs API credentials not configured, album art lookups disabled");
                None
            }
        };
        let lastfm = match &settings.lastfm_api_key {
            Some(api_key) => Some(LastFmClient::new(api_key, settings.timeout)?),
            None => {
                warn!("Last.fm API key not configured, review lookups disabled");
                None
            }
        };

        info!(
            "Enrichment: discogs={}, lastfm={}, timeout={:?}",
            discogs.is_some(),
            lastfm.is_some(),
            settings.timeout
        );
        Ok(Self::new(discogs, lastfm, settings.timeout))
    }

    pub fn has_providers(&self) -> bool {
        self.discogs.is_some() || self.lastfm.is_some()
    }

    async fn discogs_links(&self, artist: &str, title: &str, links: &mut AlbumLinks) {
        let Some(discogs) = &self.discogs else {
            return;
        };
        match timeout(self.timeout, discogs.find_release(artist, title)).await {
            Ok(Ok(Some(release))) => {
                links.album_art_url = release.album_art_url();
                links.discogs_url = release.page_url();
            }
            Ok(Ok(None)) => debug!("No Discogs release for '{}' - '{}'", artist, title),
            Ok(Err(err)) => error!("Error searching Discogs: {:#}", err),
            Err(_) => warn!(
                "Discogs lookup for '{}' - '{}' timed out after {:?}",
                artist, title, self.timeout
            ),
        }
    }

    async fn lastfm_links(&self, artist: &str, title: &str, links: &mut AlbumLinks) {
        let Some(lastfm) = &self.lastfm else {
            return;
        };
        match timeout(self.timeout, lastfm.album_url(artist, title)).await {
            Ok(Ok(url)) => links.review_url = url,
            Ok(Err(err)) => error!("Error getting Last.fm review: {:#}", err),
            Err(_) => warn!(
                "Last.fm lookup for '{}' - '{}' timed out after {:?}",
                artist, title, self.timeout
            ),
        }
    }
}

#[async_trait]
impl EnrichmentGateway for ProviderGateway {
    async fn lookup(&self, artist: &str, title: &str) -> AlbumLinks {
        let mut links = AlbumLinks::default();
        self.discogs_links(artist, title, &mut links).await;
        self.lastfm_links(artist, title, &mut links).await;
        links
    }
}
