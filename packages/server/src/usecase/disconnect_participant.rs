//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 切断した接続が参加していた全てのルームからの退出と通知
//!
//! ### なぜこのテストが必要か
//! - 複数のルームに参加していた場合でも、ルームごとに一度だけ通知されることを保証
//! - 空になったルームが削除されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数ルームに参加した接続の切断
//! - エッジケース：どのルームにも参加していない接続の切断

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{ConnectionId, DocumentId, MessagePusher, RoomRepository, Timestamp};

use super::leave_document::notify_left;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            message_pusher,
            clock,
        }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// 退出したルームのドキュメント ID
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<DocumentId> {
        // 1. 送信キューの登録解除（以降のブロードキャスト対象から外す）
        self.message_pusher.unregister_client(connection_id).await;

        // 2. 参加していた全てのルームから退出し、ルームごとに通知
        let left = self.rooms.leave_all(connection_id).await;
        let timestamp = Timestamp::new(self.clock.now_millis());
        let mut document_ids = Vec::with_capacity(left.len());
        for (document_id, participant) in left {
            notify_left(
                self.rooms.as_ref(),
                self.message_pusher.as_ref(),
                &document_id,
                participant,
                timestamp,
            )
            .await;
            document_ids.push(document_id);
        }

        tracing::info!(
            "Connection '{}' disconnected (left {} rooms)",
            connection_id,
            document_ids.len()
        );
        document_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Participant, Permission},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
        usecase::test_support::{
            connection_id, context, document_id, drain, event_names, register, user,
        },
    };
    use yoriai_shared::time::FixedClock;

    async fn join(rooms: &InMemoryRoomRepository, document: &str, connection: &str, name: &str) {
        let ctx = context(connection, user(name));
        rooms
            .join(
                document_id(document),
                Participant::new(
                    ctx.connection_id,
                    ctx.identity,
                    Timestamp::new(0),
                    Some(Permission::Read),
                ),
            )
            .await;
    }

    #[tokio::test]
    async fn test_disconnect_notifies_each_room_once() {
        // テスト項目: 2 つのルームに参加していた接続の切断で、ルームごとに 1 回ずつ通知される
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        join(&rooms, "doc-a", "c-alice", "alice").await;
        join(&rooms, "doc-b", "c-alice", "alice").await;
        join(&rooms, "doc-a", "c-bob", "bob").await;
        join(&rooms, "doc-b", "c-carol", "carol").await;
        let _alice_rx = register(&pusher, "c-alice").await;
        let mut bob_rx = register(&pusher, "c-bob").await;
        let mut carol_rx = register(&pusher, "c-carol").await;
        let usecase =
            DisconnectParticipantUseCase::new(rooms.clone(), pusher.clone(), Arc::new(FixedClock::new(0)));

        // when (操作):
        let left = usecase.execute(&connection_id("c-alice")).await;

        // then (期待する結果):
        assert_eq!(left, vec![document_id("doc-a"), document_id("doc-b")]);
        assert_eq!(event_names(&drain(&mut bob_rx)), vec!["user-disconnected"]);
        assert_eq!(event_names(&drain(&mut carol_rx)), vec!["user-disconnected"]);
        assert_eq!(pusher.count_clients(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_prunes_empty_rooms() {
        // テスト項目: 最後の参加者の切断でルームが削除される
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        join(&rooms, "doc-a", "c-alice", "alice").await;
        let usecase =
            DisconnectParticipantUseCase::new(rooms.clone(), pusher, Arc::new(FixedClock::new(0)));

        // when (操作):
        usecase.execute(&connection_id("c-alice")).await;

        // then (期待する結果):
        assert_eq!(rooms.count_rooms().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_without_rooms() {
        // テスト項目: どのルームにも参加していない接続の切断では何も通知しない
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let _rx = register(&pusher, "c-idle").await;
        let usecase =
            DisconnectParticipantUseCase::new(rooms, pusher.clone(), Arc::new(FixedClock::new(0)));

        // when (操作):
        let left = usecase.execute(&connection_id("c-idle")).await;

        // then (期待する結果):
        assert!(left.is_empty());
        assert_eq!(pusher.count_clients(), 0);
    }
}
