use anyhow::{Context, Result};
use std::time::Duration;

use tower_http::services::ServeDir;
use tracing::info;

use axum::{
    extract::{Query, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::records::{collection_error_response, PageQuery};
use super::{log_requests, make_record_routes, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub message: String,
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize)]
struct AlbumInfoQuery {
    pub artist: String,
    pub title: String,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        message: "Welcome to the Record Collection API".to_string(),
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_genres(
    State(store): State<GuardedCollectionStore>,
    Query(page): Query<PageQuery>,
) -> Response {
    match store.list_genres(page.skip, page.limit) {
        Ok(genres) => Json(genres).into_response(),
        Err(err) => collection_error_response(err),
    }
}

async fn fetch_album_info(
    State(enrichment): State<GuardedEnrichmentGateway>,
    Query(query): Query<AlbumInfoQuery>,
) -> Response {
    Json(enrichment.lookup(&query.artist, &query.title).await).into_response()
}

pub fn make_app(
    config: ServerConfig,
    collection_store: GuardedCollectionStore,
    enrichment: GuardedEnrichmentGateway,
) -> Router {
    let state = ServerState::new(config.clone(), collection_store, enrichment);

    let api_routes: Router = Router::new()
        .route("/genres", get(list_genres))
        .route("/genres/", get(list_genres))
        .route("/fetch-album-info", get(fetch_album_info))
        .with_state(state.clone())
        .merge(make_record_routes(state.clone()));

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

pub async fn run_server(
    config: ServerConfig,
    collection_store: GuardedCollectionStore,
    enrichment: GuardedEnrichmentGateway,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, collection_store, enrichment);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Ready to serve at port {}!", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
