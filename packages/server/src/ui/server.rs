//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        create_share_link, get_shared_document, health_check, health_details,
        list_collaborators, list_shares, redeem_share_link, remove_share, share_document,
        update_share_permission, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Collaboration session server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(AppState::new(dependencies, settings));
/// server.run("127.0.0.1".to_string(), 8080, Duration::from_secs(60)).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Build the router (also used by integration tests).
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/health", get(health_check))
            .route("/health/details", get(health_details))
            .route(
                "/api/share/document/{document_id}/generate-link",
                post(create_share_link),
            )
            .route("/api/share/link/{token}", get(get_shared_document))
            .route("/api/share/join-by-token", post(redeem_share_link))
            .route("/api/share/{document_id}", get(list_shares))
            .route(
                "/api/share/{document_id}/{user_id}",
                put(update_share_permission).delete(remove_share),
            )
            .route(
                "/api/share/{document_id}/collaborators",
                get(list_collaborators).post(share_document),
            )
            .route(
                "/api/share/{document_id}/collaborators/{user_id}",
                put(update_share_permission).delete(remove_share),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until a shutdown signal is received
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    /// * `reaper_interval` - Interval of the expired share link sweep
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(
        self,
        host: String,
        port: u16,
        reaper_interval: Duration,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let reaper = self
            .state
            .purge_expired_links_usecase
            .clone()
            .spawn(reaper_interval);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Collaboration server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        reaper.abort();
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
