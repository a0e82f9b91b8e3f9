//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per collection endpoint. When routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    // ========================================================================
    // Records
    // ========================================================================

    pub async fn list_records(&self, skip: usize, limit: usize) -> Response {
        self.client
            .get(self.api("/records/"))
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .expect("List records request failed")
    }

    pub async fn get_record(&self, id: i64) -> Response {
        self.client
            .get(self.api(&format!("/records/{}", id)))
            .send()
            .await
            .expect("Get record request failed")
    }

    pub async fn create_record(&self, body: &serde_json::Value) -> Response {
        self.client
            .post(self.api("/records/"))
            .json(body)
            .send()
            .await
            .expect("Create record request failed")
    }

    pub async fn update_record(&self, id: i64, body: &serde_json::Value) -> Response {
        self.client
            .put(self.api(&format!("/records/{}", id)))
            .json(body)
            .send()
            .await
            .expect("Update record request failed")
    }

    pub async fn delete_record(&self, id: i64) -> Response {
        self.client
            .delete(self.api(&format!("/records/{}", id)))
            .send()
            .await
            .expect("Delete record request failed")
    }

    pub async fn search(&self, query: &str, skip: usize, limit: usize) -> Response {
        self.client
            .get(self.api("/records/search"))
            .query(&[("q", query)])
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .expect("Search request failed")
    }

    // ========================================================================
    // Genres and enrichment
    // ========================================================================

    pub async fn list_genres(&self, skip: usize, limit: usize) -> Response {
        self.client
            .get(self.api("/genres/"))
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .expect("List genres request failed")
    }

    pub async fn fetch_album_info(&self, artist: &str, title: &str) -> Response {
        self.client
            .get(self.api("/fetch-album-info"))
            .query(&[("artist", artist), ("title", title)])
            .send()
            .await
            .expect("Fetch album info request failed")
    }
}
