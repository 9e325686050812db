//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionContext, DocumentId, RoomEvent},
    infrastructure::dto::websocket::ClientEvent,
    ui::state::AppState,
    usecase::{ConnectedParticipant, SessionError},
};

use super::auth::bearer_token;

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// GET /ws
///
/// credential は `?token=` か `Authorization: Bearer` で渡す。無くても接続できる。
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let credential = query
        .token
        .filter(|token| !token.trim().is_empty())
        .or_else(|| bearer_token(&headers));

    ws.on_upgrade(move |socket| handle_socket(socket, state, credential))
}

/// Spawns a task that drains the outbound queue into the WebSocket sink.
///
/// # Arguments
///
/// * `rx` - Outbound queue of this connection (already serialized frames)
/// * `sender` - WebSocket sink of this connection
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// If any one of the tasks completes, abort the other and wait until it has
/// actually stopped. A receive task cancelled mid-join must not touch the
/// registry after the disconnect cleanup has read the memberships.
async fn run_until_either_finishes(mut first: JoinHandle<()>, mut second: JoinHandle<()>) {
    tokio::select! {
        _ = &mut first => {
            second.abort();
            let _ = second.await;
        }
        _ = &mut second => {
            first.abort();
            let _ = first.await;
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, credential: Option<String>) {
    let (tx, rx) = mpsc::channel(state.settings.outbound_queue_capacity);

    let ConnectedParticipant { context, guard } = state
        .connect_participant_usecase
        .execute(credential.as_deref(), tx)
        .await;
    let context = Arc::new(context);

    let (sender, mut receiver) = socket.split();
    let send_task = pusher_loop(rx, sender);

    let recv_state = state.clone();
    let recv_context = context.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", recv_context.connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_text(&recv_state, &recv_context, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_context.connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    run_until_either_finishes(recv_task, send_task).await;

    let left = state
        .disconnect_participant_usecase
        .execute(&context.connection_id)
        .await;
    drop(guard);

    tracing::info!(
        "Connection '{}' closed (left {} document(s))",
        context.connection_id,
        left.len()
    );
}

async fn handle_text(state: &AppState, context: &ConnectionContext, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(
                "Unparseable frame from '{}': {}",
                context.connection_id,
                e
            );
            reply(
                state,
                context,
                RoomEvent::Error {
                    message: "Invalid message format".to_string(),
                },
            )
            .await;
            return;
        }
    };

    if let Err(e) = dispatch(state, context, event).await {
        let event = match e {
            SessionError::Unauthorized(e) => {
                tracing::warn!("Rejected join credential from '{}': {}", context.connection_id, e);
                RoomEvent::AuthError {
                    message: "Invalid authentication token".to_string(),
                }
            }
            SessionError::Repository(e) => {
                tracing::error!("Storage failure for '{}': {}", context.connection_id, e);
                RoomEvent::Error {
                    message: "Internal server error".to_string(),
                }
            }
            other => {
                tracing::debug!("Request from '{}' rejected: {}", context.connection_id, other);
                RoomEvent::Error {
                    message: other.to_string(),
                }
            }
        };
        reply(state, context, event).await;
    }
}

async fn dispatch(
    state: &AppState,
    context: &ConnectionContext,
    event: ClientEvent,
) -> Result<(), SessionError> {
    match event {
        ClientEvent::JoinDocument(payload) => {
            let document_id = DocumentId::new(payload.document_id)?;
            let snapshot = state
                .join_document_usecase
                .execute(context, document_id, payload.token.as_deref())
                .await?;
            tracing::debug!(
                "'{}' joined '{}' ({} participant(s))",
                context.connection_id,
                snapshot.document_id,
                snapshot.participants.len()
            );
        }
        ClientEvent::LeaveDocument(payload) => {
            let document_id = DocumentId::new(payload.document_id)?;
            state
                .leave_document_usecase
                .execute(context, &document_id)
                .await;
        }
        ClientEvent::DocumentChange(payload) => {
            let document_id = DocumentId::new(payload.document_id)?;
            state
                .relay_event_usecase
                .relay_change(context, &document_id, payload.changes)
                .await?;
        }
        ClientEvent::UserTyping(payload) => {
            let document_id = DocumentId::new(payload.document_id)?;
            state
                .relay_event_usecase
                .relay_typing(context, &document_id, payload.is_typing)
                .await?;
        }
        ClientEvent::CursorPosition(payload) => {
            let document_id = DocumentId::new(payload.document_id)?;
            state
                .relay_event_usecase
                .relay_cursor(context, &document_id, payload.position)
                .await?;
        }
    }
    Ok(())
}

async fn reply(state: &AppState, context: &ConnectionContext, event: RoomEvent) {
    if let Err(e) = state
        .message_pusher
        .push_to(&context.connection_id, &event)
        .await
    {
        tracing::warn!(
            "Failed to send '{}' to '{}': {}",
            event.name(),
            context.connection_id,
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_aborted_task_has_stopped_when_helper_returns() {
        // テスト項目: 片方が終了した後、もう片方のタスクは完全に停止してから戻る
        // given (前提条件):
        let steps = Arc::new(AtomicUsize::new(0));
        let busy_steps = steps.clone();
        let busy = tokio::spawn(async move {
            loop {
                busy_steps.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        });
        let finished = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
        });

        // when (操作):
        run_until_either_finishes(busy, finished).await;
        let observed = steps.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;

        // then (期待する結果):
        assert!(observed > 0);
        assert_eq!(steps.load(Ordering::SeqCst), observed);
    }

    #[tokio::test]
    async fn test_helper_returns_when_first_task_finishes() {
        // テスト項目: どちらが先に終了しても戻る
        // given (前提条件):
        let finished = tokio::spawn(async {});
        let pending = tokio::spawn(std::future::pending::<()>());

        // when (操作):
        let result =
            tokio::time::timeout(Duration::from_secs(1), run_until_either_finishes(finished, pending))
                .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
