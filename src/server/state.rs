use axum::extract::FromRef;

use crate::catalog_client::CatalogClient;
use crate::config::WrapSettings;
use crate::store::FullStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedStore = Arc<dyn FullStore>;
pub type GuardedCatalogClient = Arc<dyn CatalogClient>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedStore,
    pub catalog_client: GuardedCatalogClient,
    pub wrap_settings: WrapSettings,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedCatalogClient {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_client.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for WrapSettings {
    fn from_ref(input: &ServerState) -> Self {
        input.wrap_settings.clone()
    }
}
