//! Discogs API client for release lookups.
//!
//! Only the first hit of a release search is used: its cover image becomes
//! the album art and its page becomes the Discogs link.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DISCOGS_API_BASE: &str = "https://api.discogs.com";
const DISCOGS_SITE_BASE: &str = "https://www.discogs.com";

/// The parts of a Discogs search hit we care about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscogsRelease {
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl DiscogsRelease {
    pub fn album_art_url(&self) -> Option<String> {
        self.cover_image.clone().filter(|url| !url.trim().is_empty())
    }

    /// Release page, made absolute when Discogs returns a site-relative uri.
    pub fn page_url(&self) -> Option<String> {
        let uri = self.uri.as_deref()?.trim();
        if uri.is_empty() {
            None
        } else if uri.starts_with("http://") || uri.starts_with("https://") {
            Some(uri.to_string())
        } else {
            Some(format!(
                "{}/{}",
                DISCOGS_SITE_BASE,
                uri.trim_start_matches('/')
            ))
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DiscogsRelease>,
}

pub struct DiscogsClient {
    client: Client,
    base_url: String,
    key: String,
    secret: String,
}

impl DiscogsClient {
    pub fn new(key: &str, secret: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        // Discogs rejects requests without a User-Agent.
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build Discogs HTTP client")?;

        Ok(Self {
            client,
            base_url: DISCOGS_API_BASE.to_string(),
            key: key.to_string(),
            secret: secret.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Best matching release for `artist` and `title`, if any.
    pub async fn find_release(&self, artist: &str, title: &str) -> Result<Option<DiscogsRelease>> {
        let url = format!("{}/database/search", self.base_url);
        let query = format!("{} {}", artist, title);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("type", "release"),
                ("key", self.key.as_str()),
                ("secret", self.secret.as_str()),
            ])
            .send()
            .await
            .context("Discogs search request failed")?;

        if !response.status().is_success() {
            bail!("Discogs search failed with status {}", response.status());
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Discogs search response")?;

        Ok(body.results.into_iter().next())
    }
}
