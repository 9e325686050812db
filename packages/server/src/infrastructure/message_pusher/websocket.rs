//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの送信キュー（`PusherChannel`）を管理
//! - ドメインイベントをワイヤ形式の JSON に変換して送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成と送信キューの受信側は UI 層（`ui/handler/websocket.rs`）が持ちます。
//! 送信は `try_send` で行い、遅い接続のキューが満杯でも他の接続への配信を止めません。

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomEvent},
    infrastructure::dto::websocket::ServerEvent,
};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// Key: connection_id, Value: 送信キュー
    clients: DashMap<ConnectionId, PusherChannel>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_clients(&self) -> usize {
        self.clients.len()
    }

    fn encode(event: &RoomEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerEvent::from(event.clone()))
            .map_err(|e| MessagePushError::Encode(e.to_string()))
    }

    fn send(&self, connection_id: &ConnectionId, frame: String) -> Result<(), MessagePushError> {
        let sender = self
            .clients
            .get(connection_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;

        sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => MessagePushError::QueueFull(connection_id.to_string()),
            TrySendError::Closed(_) => MessagePushError::Closed(connection_id.to_string()),
        })
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        self.clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        self.clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(event)?;
        self.send(connection_id, frame)?;
        tracing::debug!("Pushed '{}' to connection '{}'", event.name(), connection_id);
        Ok(())
    }

    async fn broadcast(&self, targets: &[ConnectionId], event: &RoomEvent) -> usize {
        let frame = match Self::encode(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode '{}': {}", event.name(), e);
                return 0;
            }
        };

        let mut delivered = 0;
        for target in targets {
            // ブロードキャストでは一部の送信失敗を許容
            match self.send(target, frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("Dropped '{}' for {}: {}", event.name(), target, e),
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn error_event(message: &str) -> RoomEvent {
        RoomEvent::Error {
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_push_to_registered_client() {
        // テスト項目: 登録済みの接続にワイヤ形式の JSON が届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::channel(4);
        pusher.register_client(connection("c1"), tx).await;

        // when (操作):
        let result = pusher.push_to(&connection("c1"), &error_event("boom")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(
            rx.recv().await.unwrap(),
            r#"{"event":"error","data":{"message":"boom"}}"#
        );
    }

    #[tokio::test]
    async fn test_push_to_unknown_client() {
        // テスト項目: 未登録の接続への送信はエラーになる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&connection("ghost"), &error_event("boom")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ClientNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_broadcast_skips_full_queue_without_blocking_others() {
        // テスト項目: キューが満杯の接続はそのメッセージのみ破棄され、他の接続には届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        pusher.register_client(connection("slow"), slow_tx).await;
        pusher.register_client(connection("fast"), fast_tx).await;
        let targets = vec![connection("slow"), connection("fast")];

        // when (操作):
        let first = pusher.broadcast(&targets, &error_event("1")).await;
        let second = pusher.broadcast(&targets, &error_event("2")).await;

        // then (期待する結果):
        assert_eq!(first, 2);
        assert_eq!(second, 1);
        assert!(slow_rx.recv().await.unwrap().contains("\"1\""));
        assert!(slow_rx.try_recv().is_err());
        assert!(fast_rx.recv().await.unwrap().contains("\"1\""));
        assert!(fast_rx.recv().await.unwrap().contains("\"2\""));
    }

    #[tokio::test]
    async fn test_unregister_client() {
        // テスト項目: 登録解除後は送信対象にならない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::channel(1);
        pusher.register_client(connection("c1"), tx).await;

        // when (操作):
        pusher.unregister_client(&connection("c1")).await;

        // then (期待する結果):
        assert_eq!(pusher.count_clients(), 0);
        assert_eq!(
            pusher.broadcast(&[connection("c1")], &error_event("x")).await,
            0
        );
    }
}
