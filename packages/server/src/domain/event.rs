//! ルーム内で配信されるイベント
//!
//! ワイヤ形式への変換は Infrastructure 層（`infrastructure::dto`）が担う。

use serde_json::Value;

use super::{DocumentId, Identity, Participant, Timestamp};

#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// 参加直後に参加者本人へ送る現在の参加者一覧
    ConnectedUsers {
        document_id: DocumentId,
        participants: Vec<Participant>,
    },
    UserConnected {
        participant: Participant,
        timestamp: Timestamp,
    },
    UserDisconnected {
        participant: Participant,
        timestamp: Timestamp,
    },
    DocumentChanged {
        author: Identity,
        changes: Value,
        timestamp: Timestamp,
    },
    UserTyping {
        author: Identity,
        is_typing: bool,
        timestamp: Timestamp,
    },
    CursorMoved {
        author: Identity,
        position: Value,
        timestamp: Timestamp,
    },
    /// credential が拒否された
    AuthError { message: String },
    Error { message: String },
}

impl RoomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::ConnectedUsers { .. } => "connected-users",
            RoomEvent::UserConnected { .. } => "user-connected",
            RoomEvent::UserDisconnected { .. } => "user-disconnected",
            RoomEvent::DocumentChanged { .. } => "document-change",
            RoomEvent::UserTyping { .. } => "user-typing",
            RoomEvent::CursorMoved { .. } => "cursor-position",
            RoomEvent::AuthError { .. } => "auth-error",
            RoomEvent::Error { .. } => "error",
        }
    }
}
