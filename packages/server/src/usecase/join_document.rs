//! UseCase: ドキュメント（ルーム）への参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinDocumentUseCase::execute() メソッド
//! - 参加者本人への参加者一覧の送信と、他の参加者への参加通知
//!
//! ### なぜこのテストが必要か
//! - 参加者一覧（connected-users）が本人にのみ送られることを保証
//! - 参加時に提示された credential の扱い（ルーム内 Identity、拒否時のエラー）を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加、同じ接続での再参加
//! - 異常系：存在しないドキュメント、無効な credential

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{
    ConnectionContext, CredentialVerifier, DocumentId, DocumentStore, MessagePusher, Participant,
    RoomEvent, RoomRepository, RoomSnapshot, Timestamp,
};

use super::{error::SessionError, permission::PermissionResolver};

/// ドキュメント参加のユースケース
pub struct JoinDocumentUseCase {
    verifier: Arc<dyn CredentialVerifier>,
    documents: Arc<dyn DocumentStore>,
    resolver: Arc<PermissionResolver>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl JoinDocumentUseCase {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        documents: Arc<dyn DocumentStore>,
        resolver: Arc<PermissionResolver>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            documents,
            resolver,
            rooms,
            message_pusher,
            clock,
        }
    }

    /// ドキュメント参加を実行
    ///
    /// # Arguments
    ///
    /// * `context` - 参加する接続
    /// * `document_id` - 参加するドキュメント
    /// * `credential` - 参加時に提示された credential。検証できればこのルームでの Identity になる
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSnapshot)` - 参加後の参加者一覧（本人を含む）
    /// * `Err(SessionError)` - credential の拒否、ドキュメントが存在しない等
    pub async fn execute(
        &self,
        context: &ConnectionContext,
        document_id: DocumentId,
        credential: Option<&str>,
    ) -> Result<RoomSnapshot, SessionError> {
        // 1. ルーム内で使う Identity の決定（接続の Identity は変更しない）
        let identity = match credential {
            Some(credential) => self.verifier.verify(credential)?,
            None => context.identity.clone(),
        };

        // 2. ドキュメントの存在確認と権限の解決
        let document = self
            .documents
            .get_document(&document_id)
            .await?
            .ok_or_else(|| SessionError::DocumentNotFound(document_id.to_string()))?;
        let permission = self.resolver.resolve_for(&document, &identity).await?;

        // 3. ルームに参加
        let now = Timestamp::new(self.clock.now_millis());
        let participant =
            Participant::new(context.connection_id.clone(), identity, now, permission);
        let joined = self.rooms.join(document_id, participant.clone()).await;
        let snapshot = joined.snapshot;

        tracing::info!(
            "'{}' joined document '{}' with permission {:?} ({} participants)",
            participant.identity.username,
            snapshot.document_id,
            permission,
            snapshot.participants.len()
        );

        // 4. 本人に参加者一覧を送信
        let connected_users = RoomEvent::ConnectedUsers {
            document_id: snapshot.document_id.clone(),
            participants: snapshot.participants.clone(),
        };
        if let Err(e) = self
            .message_pusher
            .push_to(&context.connection_id, &connected_users)
            .await
        {
            tracing::warn!("Failed to send participant list: {}", e);
        }

        // 5. 新規参加の場合のみ他の参加者に通知
        if joined.replaced.is_none() {
            let targets = snapshot.connection_ids_except(&context.connection_id);
            self.message_pusher
                .broadcast(
                    &targets,
                    &RoomEvent::UserConnected {
                        participant,
                        timestamp: now,
                    },
                )
                .await;
        }

        Ok(snapshot)
    }
}
