//! UseCase: ルーム内イベントの中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 編集内容（document-change）、入力中表示、カーソル位置の中継
//! - 編集内容の永続化の条件
//!
//! ### なぜこのテストが必要か
//! - 送信者本人には中継されないことを保証
//! - 匿名ユーザーの編集は中継されるが永続化されないことを確認
//! - 永続化の失敗が中継を妨げないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：書き込み権限のあるユーザーの編集
//! - 異常系：未参加のルームへの送信、読み取り権限のみのユーザーの編集
//! - エッジケース：永続化ストアの障害

use std::sync::Arc;

use serde_json::Value;
use yoriai_shared::time::Clock;

use crate::domain::{
    ConnectionContext, DocumentId, DocumentStore, MessagePusher, Participant, Permission,
    RoomEvent, RoomRepository, Timestamp,
};

use super::error::SessionError;

/// ルーム内イベント中継のユースケース
pub struct RelayEventUseCase {
    rooms: Arc<dyn RoomRepository>,
    documents: Arc<dyn DocumentStore>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl RelayEventUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        documents: Arc<dyn DocumentStore>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            documents,
            message_pusher,
            clock,
        }
    }

    /// 編集内容を中継する
    ///
    /// 認証済みユーザーは書き込み権限が必要で、中継後に編集内容をバックグラウンドで永続化する。
    /// 匿名ユーザーの編集は中継のみ行う。
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 中継できた接続数
    /// * `Err(SessionError)` - 未参加、または権限不足
    pub async fn relay_change(
        &self,
        context: &ConnectionContext,
        document_id: &DocumentId,
        changes: Value,
    ) -> Result<usize, SessionError> {
        let sender = self.participant(context, document_id).await?;
        let durable = sender.identity.is_durable();

        if durable && !Permission::allows(sender.permission, Permission::Write) {
            return Err(SessionError::Forbidden(document_id.to_string()));
        }

        let event = RoomEvent::DocumentChanged {
            author: sender.identity.clone(),
            changes: changes.clone(),
            timestamp: Timestamp::new(self.clock.now_millis()),
        };
        let delivered = self.broadcast_to_others(context, document_id, &event).await;

        if durable {
            self.persist_in_background(document_id.clone(), changes, sender);
        }

        Ok(delivered)
    }

    /// 入力中の状態を中継する（永続化しない）
    pub async fn relay_typing(
        &self,
        context: &ConnectionContext,
        document_id: &DocumentId,
        is_typing: bool,
    ) -> Result<usize, SessionError> {
        let sender = self.participant(context, document_id).await?;
        let event = RoomEvent::UserTyping {
            author: sender.identity,
            is_typing,
            timestamp: Timestamp::new(self.clock.now_millis()),
        };
        Ok(self.broadcast_to_others(context, document_id, &event).await)
    }

    /// カーソル位置を中継する（永続化しない）
    pub async fn relay_cursor(
        &self,
        context: &ConnectionContext,
        document_id: &DocumentId,
        position: Value,
    ) -> Result<usize, SessionError> {
        let sender = self.participant(context, document_id).await?;
        let event = RoomEvent::CursorMoved {
            author: sender.identity,
            position,
            timestamp: Timestamp::new(self.clock.now_millis()),
        };
        Ok(self.broadcast_to_others(context, document_id, &event).await)
    }

    async fn participant(
        &self,
        context: &ConnectionContext,
        document_id: &DocumentId,
    ) -> Result<Participant, SessionError> {
        self.rooms
            .find_participant(document_id, &context.connection_id)
            .await
            .ok_or_else(|| SessionError::NotInRoom(document_id.to_string()))
    }

    async fn broadcast_to_others(
        &self,
        context: &ConnectionContext,
        document_id: &DocumentId,
        event: &RoomEvent,
    ) -> usize {
        let targets: Vec<_> = self
            .rooms
            .list_participants(document_id)
            .await
            .into_iter()
            .map(|p| p.connection_id)
            .filter(|id| id != &context.connection_id)
            .collect();
        self.message_pusher.broadcast(&targets, event).await
    }

    fn persist_in_background(&self, document_id: DocumentId, changes: Value, author: Participant) {
        let documents = Arc::clone(&self.documents);
        tokio::spawn(async move {
            let user_id = author.identity.user_id;
            if let Err(e) = documents
                .record_change(&document_id, &changes, &user_id)
                .await
            {
                tracing::warn!(
                    "Failed to persist change on '{}' by '{}': {}",
                    document_id,
                    user_id,
                    e
                );
            }
        });
    }
}
