//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database and a fake
//! catalog serving fixed listening data.

use super::constants::*;
use super::fixtures::{
    create_test_db_with_users, test_recent_plays, test_top_artists, test_top_tracks,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use wrapped_server::catalog_client::CatalogClient;
use wrapped_server::config::WrapSettings;
use wrapped_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use wrapped_server::store::SqliteWrapStore;
use wrapped_server::wrapped::models::{ArtistRecord, RecentPlay, TimeRange, TrackRecord};

/// Catalog double: full data for [`CATALOG_ACCESS_TOKEN`], nothing otherwise
struct FakeCatalogClient;

impl FakeCatalogClient {
    fn authorized(access_token: &str) -> bool {
        access_token == CATALOG_ACCESS_TOKEN
    }
}

#[async_trait]
impl CatalogClient for FakeCatalogClient {
    async fn fetch_top_tracks(
        &self,
        access_token: &str,
        _time_range: TimeRange,
        limit: usize,
    ) -> Vec<TrackRecord> {
        if !Self::authorized(access_token) {
            return vec![];
        }
        test_top_tracks().into_iter().take(limit).collect()
    }

    async fn fetch_top_artists(
        &self,
        access_token: &str,
        _time_range: TimeRange,
        limit: usize,
    ) -> Vec<ArtistRecord> {
        if !Self::authorized(access_token) {
            return vec![];
        }
        test_top_artists().into_iter().take(limit).collect()
    }

    async fn fetch_recently_played(&self, access_token: &str, limit: usize) -> Vec<RecentPlay> {
        if !Self::authorized(access_token) {
            return vec![];
        }
        test_recent_plays().into_iter().take(limit).collect()
    }

    fn authorize_url(&self, state: &str) -> Option<String> {
        Some(format!("https://accounts.test/authorize?state={}", state))
    }
}

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and the temp database is
/// removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store for direct database access in tests
    pub store: Arc<SqliteWrapStore>,

    /// Session token of [`TEST_USER`]
    pub user_token: String,

    /// Session token of [`OTHER_USER`]
    pub other_user_token: String,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound or
    /// the server doesn't become ready within timeout.
    pub async fn spawn() -> Self {
        let (temp_db_dir, db_path, tokens) =
            create_test_db_with_users().expect("Failed to create test database");
        let store = Arc::new(SqliteWrapStore::new(&db_path).expect("Failed to open store"));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
        };
        let app = make_app(
            config,
            store.clone(),
            Arc::new(FakeCatalogClient),
            WrapSettings::default(),
        );

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            user_token: tokens.test_user,
            other_user_token: tokens.other_user,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

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
