//! Stub HTTP host serving fixed image bytes for ingestion round trips

use super::constants::{OTHER_IMAGE_BYTES, TEST_IMAGE_BYTES};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

/// A tiny HTTP server the ingestion pipeline can download from.
///
/// When dropped, the host shuts down.
pub struct TestImageHost {
    pub base_url: String,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestImageHost {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind image host port");
        let port = listener
            .local_addr()
            .expect("Failed to get image host address")
            .port();

        let app = Router::new()
            .route("/test.png", get(|| async { TEST_IMAGE_BYTES.to_vec() }))
            .route("/other.png", get(|| async { OTHER_IMAGE_BYTES.to_vec() }))
            .route("/missing.png", get(|| async { StatusCode::NOT_FOUND }));

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Image host failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// URL of the primary test image.
    pub fn test_image_url(&self) -> String {
        format!("{}/test.png", self.base_url)
    }

    /// URL of the second test image, for update scenarios.
    pub fn other_image_url(&self) -> String {
        format!("{}/other.png", self.base_url)
    }

    /// URL the host answers with 404.
    pub fn missing_image_url(&self) -> String {
        format!("{}/missing.png", self.base_url)
    }
}
