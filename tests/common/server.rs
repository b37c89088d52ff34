//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database file and image
//! directory under a temporary directory.

use super::constants::*;
use bookshelf_server::ingestion::{HttpImageFetcher, ImageIngestor, ImageStorage};
use bookshelf_server::library::{BookService, ImageWritePolicy, SqliteLibraryStore};
use bookshelf_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use bookshelf_server::sqlite_persistence::open_database;
use bookshelf_server::user::{SqliteUserStore, UserManager, UserStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database and image directory.
///
/// When dropped, the server gracefully shuts down and the temp directory is
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The directory ingested image files land in, for on-disk assertions
    pub images_dir: PathBuf,

    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with the default open image policy.
    pub async fn spawn() -> Self {
        Self::spawn_with_policy(ImageWritePolicy::Open).await
    }

    /// Spawns a server on a random port:
    /// 1. Opens a fresh database in a temp directory and seeds the default users
    /// 2. Binds 127.0.0.1:0 and serves the real app in a background task
    /// 3. Waits for the server to answer before returning
    pub async fn spawn_with_policy(policy: ImageWritePolicy) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("books.db");
        let images_dir = temp_dir.path().join("images");

        let conn = open_database(&db_path).expect("Failed to open database");
        let user_store: Arc<dyn UserStore> =
            Arc::new(SqliteUserStore::new(conn.clone()).expect("Failed to create user store"));
        let library_store =
            Arc::new(SqliteLibraryStore::new(conn).expect("Failed to create library store"));

        let user_manager = Arc::new(UserManager::new(user_store.clone()));
        user_manager
            .seed_default_users()
            .expect("Failed to seed users");

        let ingestor = ImageIngestor::new(
            Box::new(HttpImageFetcher::new(REQUEST_TIMEOUT_SECS)),
            ImageStorage::new(images_dir.clone()),
        );
        let book_service = Arc::new(BookService::new(
            user_store,
            library_store.clone(),
            library_store,
            ingestor,
            policy,
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            base_url: base_url.clone(),
        };
        let app = make_app(config, book_service, user_manager);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
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
            images_dir,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to answer; any HTTP response counts as ready.
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

            match client
                .get(format!("{}/api/v1/books/list", self.base_url))
                .send()
                .await
            {
                Ok(_) => return,
                Err(_) => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}
