//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own collection database.

use super::constants::*;
use super::fixtures::seed_collection;
use async_trait::async_trait;
use record_collection_server::collection_store::SqliteCollectionStore;
use record_collection_server::enrichment::{AlbumLinks, EnrichmentGateway};
use record_collection_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Knows links for a single album, nothing for anything else.
struct StubGateway;

#[async_trait]
impl EnrichmentGateway for StubGateway {
    async fn lookup(&self, artist: &str, title: &str) -> AlbumLinks {
        if artist == ENRICHED_ARTIST && title == ENRICHED_TITLE {
            AlbumLinks {
                album_art_url: Some(STUB_ALBUM_ART_URL.to_string()),
                discogs_url: Some(STUB_DISCOGS_URL.to_string()),
                review_url: Some(STUB_REVIEW_URL.to_string()),
            }
        } else {
            AlbumLinks::default()
        }
    }
}

/// Test server instance with an isolated database
///
/// When dropped, the server shuts down and the temp directory is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    pub port: u16,

    /// Store shared with the server, for direct assertions
    pub store: Arc<SqliteCollectionStore>,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with the seeded collection on a random port
    pub async fn spawn() -> Self {
        Self::spawn_with(true).await
    }

    /// Spawns a server over an empty collection
    pub async fn spawn_empty() -> Self {
        Self::spawn_with(false).await
    }

    async fn spawn_with(seeded: bool) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteCollectionStore::with_read_pool(temp_db_dir.path().join("collection.db"), 2)
                .expect("Failed to open collection store"),
        );
        if seeded {
            seed_collection(&store);
        }

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port: 0,
            frontend_dir_path: None,
        };
        let app = make_app(config, store.clone(), Arc::new(StubGateway));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr: SocketAddr = listener.local_addr().expect("Failed to get local address");
        let port = addr.port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed to start");
        });

        let server = Self {
            base_url,
            port,
            store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::new();
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
