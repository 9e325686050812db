//! Real-time document collaboration server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin yoriai-server
//! cargo run --bin yoriai-server -- --host 0.0.0.0 --port 3000 --documents documents.json
//! ```

use std::sync::Arc;

use yoriai_server::{
    config::Args,
    domain::ConnectionCounter,
    infrastructure::{
        auth::JwtCredentialVerifier,
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryDocumentStore, InMemoryRoomRepository, InMemoryShareGrantRepository,
            InMemoryShareLinkRepository,
        },
    },
    ui::{AppDependencies, AppState, Server},
};
use yoriai_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::load();
    let settings = match args.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. MessagePusher
    // 3. Credential verifier
    // 4. AppState (UseCases)
    // 5. Server

    // 1. Create Repositories (in-memory)
    let documents = Arc::new(InMemoryDocumentStore::new());
    if let Some(path) = &args.documents {
        match documents.load_seed_file(path) {
            Ok(count) => tracing::info!("Seeded {} document(s) from {}", count, path.display()),
            Err(e) => {
                tracing::error!("Failed to seed documents from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
    let rooms = Arc::new(InMemoryRoomRepository::new());
    let grants = Arc::new(InMemoryShareGrantRepository::new());
    let links = Arc::new(InMemoryShareLinkRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create credential verifier
    let verifier = Arc::new(JwtCredentialVerifier::new(args.jwt_secret.as_deref()));

    // 4. Create AppState
    let state = AppState::new(
        AppDependencies {
            rooms,
            documents,
            grants,
            links,
            message_pusher,
            verifier,
            counter: Arc::new(ConnectionCounter::new()),
            clock: Arc::new(SystemClock),
        },
        settings,
    );

    // 5. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server
        .run(args.host.clone(), args.port, args.reaper_interval())
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
