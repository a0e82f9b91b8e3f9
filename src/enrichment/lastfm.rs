//! Last.fm API client for album page lookups.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const LASTFM_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

pub struct LastFmClient {
    client: Client,
    base_url: String,
    api_key: String,
}

// album.getinfo answers unknown albums with 200 and an error body, so every
// field is optional.
#[derive(Deserialize)]
struct AlbumInfoResponse {
    album: Option<LastFmAlbum>,
    error: Option<i64>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct LastFmAlbum {
    url: Option<String>,
}

impl LastFmClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Last.fm HTTP client")?;

        Ok(Self {
            client,
            base_url: LASTFM_API_BASE.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Last.fm album page, used as the review link.
    pub async fn album_url(&self, artist: &str, title: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("method", "album.getinfo"),
                ("api_key", self.api_key.as_str()),
                ("artist", artist),
                ("album", title),
                ("format", "json"),
            ])
            .send()
            .await
            .context("Last.fm album.getinfo request failed")?;

        if !response.status().is_success() {
            bail!("Last.fm API failed with status {}", response.status());
        }

        let body: AlbumInfoResponse = response
            .json()
            .await
            .context("Failed to parse Last.fm album.getinfo response")?;

        Ok(album_url_from(body))
    }
}

fn album_url_from(body: AlbumInfoResponse) -> Option<String> {
    if let Some(code) = body.error {
        tracing::debug!(
            "Last.fm album.getinfo error {}: {}",
            code,
            body.message.unwrap_or_default()
        );
        return None;
    }
    body.album
        .and_then(|album| album.url)
        .filter(|url| !url.trim().is_empty())
}
