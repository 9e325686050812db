//! UseCase: ドキュメント（ルーム）からの退出

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{
    ConnectionContext, DocumentId, MessagePusher, Participant, RoomEvent, RoomRepository,
    Timestamp,
};

/// ドキュメント退出のユースケース
pub struct LeaveDocumentUseCase {
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl LeaveDocumentUseCase {
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

    /// 退出を実行し、残りの参加者に通知する
    ///
    /// 参加していなかった場合は何もせず `None` を返す。
    pub async fn execute(
        &self,
        context: &ConnectionContext,
        document_id: &DocumentId,
    ) -> Option<Participant> {
        let participant = self
            .rooms
            .leave(document_id, &context.connection_id)
            .await?;

        notify_left(
            self.rooms.as_ref(),
            self.message_pusher.as_ref(),
            document_id,
            participant.clone(),
            Timestamp::new(self.clock.now_millis()),
        )
        .await;

        tracing::info!(
            "'{}' left document '{}'",
            participant.identity.username,
            document_id
        );
        Some(participant)
    }
}

/// ルームに残っている参加者へ退出を通知する
pub(crate) async fn notify_left(
    rooms: &dyn RoomRepository,
    message_pusher: &dyn MessagePusher,
    document_id: &DocumentId,
    participant: Participant,
    timestamp: Timestamp,
) {
    let targets: Vec<_> = rooms
        .list_participants(document_id)
        .await
        .into_iter()
        .map(|p| p.connection_id)
        .collect();
    if targets.is_empty() {
        return;
    }
    message_pusher
        .broadcast(
            &targets,
            &RoomEvent::UserDisconnected {
                participant,
                timestamp,
            },
        )
        .await;
}
