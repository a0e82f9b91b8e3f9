//! EnrichmentGateway trait definition and the caller-side fill rule.

use crate::collection_store::NewRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Links found for an album. Each one may be missing independently.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumLinks {
    pub album_art_url: Option<String>,
    pub discogs_url: Option<String>,
    pub review_url: Option<String>,
}

/// Best-effort album metadata lookup.
///
/// Implementations never fail: provider errors and timeouts are logged and
/// show up as absent links.
#[async_trait]
pub trait EnrichmentGateway: Send + Sync {
    async fn lookup(&self, artist: &str, title: &str) -> AlbumLinks;
}

/// Gateway used when no provider is configured.
pub struct NoOpGateway;

#[async_trait]
impl EnrichmentGateway for NoOpGateway {
    async fn lookup(&self, _artist: &str, _title: &str) -> AlbumLinks {
        AlbumLinks::default()
    }
}

fn is_missing(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn fill(target: &mut Option<String>, found: Option<String>) {
    if is_missing(target) {
        if let Some(found) = found {
            *target = Some(found);
        }
    }
}

/// Fill the album links the user left empty.
///
/// The gateway is consulted only when at least one link is missing, and
/// values supplied by the user are never overwritten.
pub async fn fill_missing_links(gateway: &dyn EnrichmentGateway, record: &mut NewRecord) {
    if !is_missing(&record.album_art_url)
        && !is_missing(&record.discogs_url)
        && !is_missing(&record.review_url)
    {
        return;
    }

    let links = gateway.lookup(&record.artist, &record.title).await;
    debug!(
        "Enrichment for '{}' - '{}': art={}, discogs={}, review={}",
        record.artist,
        record.title,
        links.album_art_url.is_some(),
        links.discogs_url.is_some(),
        links.review_url.is_some()
    );

    fill(&mut record.album_art_url, links.album_art_url);
    fill(&mut record.discogs_url, links.discogs_url);
    fill(&mut record.review_url, links.review_url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockGateway {
        links: AlbumLinks,
        calls: AtomicUsize,
    }

    impl MockGateway {
        fn returning(links: AlbumLinks) -> Self {
            Self {
                links,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EnrichmentGateway for MockGateway {
        async fn lookup(&self, _artist: &str, _title: &str) -> AlbumLinks {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.links.clone()
        }
    }

    fn all_links() -> AlbumLinks {
        AlbumLinks {
            album_art_url: Some("https://img.example/cover.jpg".to_string()),
            discogs_url: Some("https://www.discogs.com/release/1".to_string()),
            review_url: Some("https://www.last.fm/music/a/b".to_string()),
        }
    }

    #[tokio::test]
    async fn fills_only_missing_fields() {
        let gateway = MockGateway::returning(all_links());
        let mut record = NewRecord {
            album_art_url: Some("https://mine.example/art.png".to_string()),
            ..NewRecord::new("Title", "Artist")
        };

        fill_missing_links(&gateway, &mut record).await;

        assert_eq!(
            record.album_art_url.as_deref(),
            Some("https://mine.example/art.png")
        );
        assert_eq!(record.discogs_url, all_links().discogs_url);
        assert_eq!(record.review_url, all_links().review_url);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn skips_the_gateway_when_nothing_is_missing() {
        let gateway = MockGateway::returning(AlbumLinks::default());
        let mut record = NewRecord {
            album_art_url: Some("a".to_string()),
            discogs_url: Some("b".to_string()),
            review_url: Some("c".to_string()),
            ..NewRecord::new("Title", "Artist")
        };

        fill_missing_links(&gateway, &mut record).await;

        assert_eq!(gateway.call_count(), 0);
        assert_eq!(record.review_url.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn blank_values_count_as_missing() {
        let gateway = MockGateway::returning(all_links());
        let mut record = NewRecord {
            album_art_url: Some("  ".to_string()),
            discogs_url: Some("b".to_string()),
            review_url: Some("c".to_string()),
            ..NewRecord::new("Title", "Artist")
        };

        fill_missing_links(&gateway, &mut record).await;

        assert_eq!(record.album_art_url, all_links().album_art_url);
        assert_eq!(record.discogs_url.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn absent_results_leave_fields_empty() {
        let mut record = NewRecord::new("Title", "Artist");

        fill_missing_links(&NoOpGateway, &mut record).await;

        assert_eq!(record.album_art_url, None);
        assert_eq!(record.discogs_url, None);
        assert_eq!(record.review_url, None);
    }
}
