//! UseCase テスト用のフィクスチャ

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionContext, ConnectionId, Document, DocumentId, Identity, MessagePusher,
        Timestamp, UserId,
    },
    infrastructure::message_pusher::WebSocketMessagePusher,
};

pub fn document_id(id: &str) -> DocumentId {
    DocumentId::new(id.to_string()).unwrap()
}

pub fn connection_id(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

pub fn user_id(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn user(id: &str) -> Identity {
    Identity::authenticated(user_id(id), format!("{id}-name"))
}

pub fn document(id: &str, owner: &str) -> Document {
    Document {
        id: document_id(id),
        title: format!("Title of {id}"),
        owner_id: user_id(owner),
        collaborator_ids: Vec::new(),
        is_shared: false,
    }
}

pub fn context(connection: &str, identity: Identity) -> ConnectionContext {
    ConnectionContext {
        connection_id: connection_id(connection),
        identity,
        connected_at: Timestamp::new(0),
    }
}

pub fn anonymous_context(connection: &str) -> ConnectionContext {
    let id = connection_id(connection);
    ConnectionContext {
        identity: Identity::anonymous(&id),
        connection_id: id,
        connected_at: Timestamp::new(0),
    }
}

/// 接続を登録し、送信キューの受信側を返す
pub async fn register(
    pusher: &Arc<WebSocketMessagePusher>,
    connection: &str,
) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(64);
    pusher.register_client(connection_id(connection), tx).await;
    rx
}

/// 受信済みのフレームを全て取り出して JSON にする
pub fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(&frame).unwrap());
    }
    frames
}

/// 受信済みフレームのイベント名
pub fn event_names(frames: &[Value]) -> Vec<String> {
    frames
        .iter()
        .map(|f| f["event"].as_str().unwrap_or_default().to_string())
        .collect()
}
