mod file_config;

pub use file_config::{CatalogConfig, FileConfig, WrapConfig};

use crate::server::RequestsLoggingLevel;
use crate::wrapped::SnapshotSettings;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_SCOPES: &str = "user-top-read user-read-recently-played";

/// Values given on the command line, each one may be replaced by the TOML file.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    pub catalog: CatalogSettings,
    pub wrap: WrapSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub client_id: Option<String>,
    pub redirect_uri: String,
    pub scopes: String,
    pub timeout_sec: u64,
}

impl CatalogSettings {
    fn default_for_port(port: u16) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            accounts_base_url: DEFAULT_ACCOUNTS_BASE_URL.to_string(),
            client_id: None,
            redirect_uri: format!("http://localhost:{}/callback", port),
            scopes: DEFAULT_SCOPES.to_string(),
            timeout_sec: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapSettings {
    pub top_items_limit: usize,
    pub candidate_pool_size: usize,
    pub genre_pool_size: usize,
    pub recently_played_limit: usize,
}

impl Default for WrapSettings {
    fn default() -> Self {
        Self {
            top_items_limit: 10,
            candidate_pool_size: 50,
            genre_pool_size: 50,
            recently_played_limit: 50,
        }
    }
}

impl WrapSettings {
    pub fn snapshot_settings(&self) -> SnapshotSettings {
        SnapshotSettings {
            top_items_limit: self.top_items_limit,
            candidate_pool_size: self.candidate_pool_size,
            genre_pool_size: self.genre_pool_size,
        }
    }

    /// How many tracks and artists to request upstream, enough for both the
    /// top lists and the game pool.
    pub fn fetch_limit(&self) -> usize {
        self.top_items_limit
            .max(self.candidate_pool_size)
            .max(self.genre_pool_size)
    }
}

impl AppConfig {
    /// Merges the command line with the optional TOML file, the file wins
    /// field by field. The database directory must already exist.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .context("No database directory, pass --db-dir or set db_dir in the config file")?;
        check_db_dir(&db_dir)?;

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let catalog_defaults = CatalogSettings::default_for_port(port);
        let catalog_file = file.catalog.unwrap_or_default();
        let catalog = CatalogSettings {
            api_base_url: catalog_file
                .api_base_url
                .unwrap_or(catalog_defaults.api_base_url),
            accounts_base_url: catalog_file
                .accounts_base_url
                .unwrap_or(catalog_defaults.accounts_base_url),
            client_id: catalog_file.client_id.filter(|id| !id.trim().is_empty()),
            redirect_uri: catalog_file
                .redirect_uri
                .unwrap_or(catalog_defaults.redirect_uri),
            scopes: catalog_file.scopes.unwrap_or(catalog_defaults.scopes),
            timeout_sec: catalog_file
                .timeout_sec
                .unwrap_or(catalog_defaults.timeout_sec),
        };

        let wrap_defaults = WrapSettings::default();
        let wrap_file = file.wrap.unwrap_or_default();
        let wrap = WrapSettings {
            top_items_limit: wrap_file
                .top_items_limit
                .unwrap_or(wrap_defaults.top_items_limit),
            candidate_pool_size: wrap_file
                .candidate_pool_size
                .unwrap_or(wrap_defaults.candidate_pool_size),
            genre_pool_size: wrap_file
                .genre_pool_size
                .unwrap_or(wrap_defaults.genre_pool_size),
            recently_played_limit: wrap_file
                .recently_played_limit
                .unwrap_or(wrap_defaults.recently_played_limit),
        };
        if wrap.top_items_limit == 0 {
            bail!("wrap.top_items_limit must be greater than 0");
        }

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            catalog,
            wrap,
        })
    }

    pub fn wrapped_db_path(&self) -> PathBuf {
        self.db_dir.join("wrapped.db")
    }
}

fn check_db_dir(db_dir: &Path) -> Result<()> {
    match std::fs::metadata(db_dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => bail!("{:?} is a file, expected the database directory", db_dir),
        Err(_) => bail!("Missing database directory {:?}", db_dir),
    }
}

/// Case-insensitive, unknown names are ignored.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
