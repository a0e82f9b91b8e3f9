//! Record API routes

use crate::collection_store::{
    validate_new_record, CollectionError, NewRecord, RecordUpdate, ValidationError,
};
use crate::enrichment::fill_missing_links;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::state::{GuardedCollectionStore, GuardedEnrichmentGateway, ServerState};

pub(super) const DEFAULT_PAGE_LIMIT: usize = 100;

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

#[derive(Deserialize)]
pub(super) struct PageQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Serialize)]
struct ValidationErrorBody {
    error: String,
    field: String,
}

fn validation_error_response(err: ValidationError) -> Response {
    let body = ValidationErrorBody {
        error: err.to_string(),
        field: err.field().to_string(),
    };
    (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
}

/// Validation failures become 422 with the offending field, anything else an opaque 500.
pub(super) fn collection_error_response(err: CollectionError) -> Response {
    match err {
        CollectionError::Validation(err) => validation_error_response(err),
        CollectionError::Storage(err) => {
            error!("Collection storage error: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn list_records(
    State(store): State<GuardedCollectionStore>,
    Query(page): Query<PageQuery>,
) -> Response {
    match store.list_records(page.skip, page.limit) {
        Ok(records) => Json(records).into_response(),
        Err(err) => collection_error_response(err),
    }
}

async fn search_records(
    State(store): State<GuardedCollectionStore>,
    Query(query): Query<SearchQuery>,
) -> Response {
    match store.search_records(&query.q, query.skip, query.limit) {
        Ok(results) => Json(results).into_response(),
        Err(err) => collection_error_response(err),
    }
}

async fn get_record(State(store): State<GuardedCollectionStore>, Path(id): Path<i64>) -> Response {
    match store.get_record(id) {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => collection_error_response(err),
    }
}

async fn create_record(
    State(store): State<GuardedCollectionStore>,
    State(enrichment): State<GuardedEnrichmentGateway>,
    Json(mut input): Json<NewRecord>,
) -> Response {
    // Reject bad input before spending time on provider lookups.
    if let Err(err) = validate_new_record(&input) {
        return validation_error_response(err);
    }

    fill_missing_links(enrichment.as_ref(), &mut input).await;

    match store.create_record(&input) {
        Ok(record) => Json(record).into_response(),
        Err(err) => collection_error_response(err),
    }
}

async fn update_record(
    State(store): State<GuardedCollectionStore>,
    Path(id): Path<i64>,
    Json(changes): Json<RecordUpdate>,
) -> Response {
    match store.update_record(id, &changes) {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => collection_error_response(err),
    }
}

async fn delete_record(
    State(store): State<GuardedCollectionStore>,
    Path(id): Path<i64>,
) -> Response {
    match store.delete_record(id) {
        Ok(true) => Json(true).into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => collection_error_response(err),
    }
}

pub fn make_record_routes(state: ServerState) -> Router {
    Router::new()
        .route("/records", get(list_records).post(create_record))
        .route("/records/", get(list_records).post(create_record))
        .route("/records/search", get(search_records))
        .route(
            "/records/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(state)
}
