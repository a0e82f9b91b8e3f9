use axum::extract::FromRef;

use crate::collection_store::CollectionStore;
use crate::enrichment::EnrichmentGateway;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCollectionStore = Arc<dyn CollectionStore>;
pub type GuardedEnrichmentGateway = Arc<dyn EnrichmentGateway>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub collection_store: GuardedCollectionStore,
    pub enrichment: GuardedEnrichmentGateway,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        collection_store: GuardedCollectionStore,
        enrichment: GuardedEnrichmentGateway,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            collection_store,
            enrichment,
        }
    }
}

impl FromRef<ServerState> for GuardedCollectionStore {
    fn from_ref(input: &ServerState) -> Self {
        input.collection_store.clone()
    }
}

impl FromRef<ServerState> for GuardedEnrichmentGateway {
    fn from_ref(input: &ServerState) -> Self {
        input.enrichment.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
