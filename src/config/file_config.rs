use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,

    // Feature configs
    pub catalog: Option<CatalogConfig>,
    pub wrap: Option<WrapConfig>,
}

/// `[catalog]` section, the music catalog the wraps are fetched from.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base_url: Option<String>,
    pub accounts_base_url: Option<String>,
    /// Public OAuth client id, only needed to build the consent URL.
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scopes: Option<String>,
    pub timeout_sec: Option<u64>,
}

/// `[wrap]` section, sizes of the aggregated lists.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WrapConfig {
    pub top_items_limit: Option<usize>,
    pub candidate_pool_size: Option<usize>,
    pub genre_pool_size: Option<usize>,
    pub recently_played_limit: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
