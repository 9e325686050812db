//! InMemory Room Repository 実装
//!
//! ルームごとに `tokio::sync::Mutex` を持ち、同じルームへの操作のみを直列化します。
//! ルームの索引と接続ごとの参加ルームの索引には `DashMap` を使います。
//!
//! ## 空ルームの削除
//!
//! 最後の参加者が退出したルームは、ロックを保持したまま `closed` を立ててから索引から外します。
//! 索引から取得したルームが `closed` だった場合、参加処理は索引の取得からやり直します。

use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DocumentId, JoinedRoom, Participant, Room, RoomRepository, RoomSnapshot,
};

struct RoomSlot {
    room: Room,
    closed: bool,
}

type SharedSlot = Arc<Mutex<RoomSlot>>;

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: DashMap<DocumentId, SharedSlot>,
    memberships: DashMap<ConnectionId, BTreeSet<DocumentId>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, document_id: &DocumentId) -> Option<SharedSlot> {
        self.rooms.get(document_id).map(|entry| Arc::clone(entry.value()))
    }

    fn forget_membership(&self, connection_id: &ConnectionId, document_id: &DocumentId) {
        if let Some(mut rooms) = self.memberships.get_mut(connection_id) {
            rooms.remove(document_id);
        }
        self.memberships
            .remove_if(connection_id, |_, rooms| rooms.is_empty());
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join(&self, document_id: DocumentId, participant: Participant) -> JoinedRoom {
        loop {
            let slot = Arc::clone(
                self.rooms
                    .entry(document_id.clone())
                    .or_insert_with(|| {
                        Arc::new(Mutex::new(RoomSlot {
                            room: Room::new(document_id.clone()),
                            closed: false,
                        }))
                    })
                    .value(),
            );

            let mut guard = slot.lock().await;
            if guard.closed {
                // 削除中のルームを掴んだので取り直す
                continue;
            }

            let connection_id = participant.connection_id.clone();
            let replaced = guard.room.join(participant);
            self.memberships
                .entry(connection_id)
                .or_default()
                .insert(document_id.clone());

            tracing::debug!(
                "Connection joined room '{}' ({} participants)",
                document_id,
                guard.room.participants().len()
            );

            return JoinedRoom {
                snapshot: RoomSnapshot {
                    document_id,
                    participants: guard.room.participants().to_vec(),
                },
                replaced,
            };
        }
    }

    async fn leave(
        &self,
        document_id: &DocumentId,
        connection_id: &ConnectionId,
    ) -> Option<Participant> {
        let slot = self.slot(document_id)?;
        let mut guard = slot.lock().await;
        if guard.closed {
            return None;
        }

        let removed = guard.room.leave(connection_id);
        if removed.is_some() {
            self.forget_membership(connection_id, document_id);
        }

        if guard.room.is_empty() {
            guard.closed = true;
            self.rooms
                .remove_if(document_id, |_, current| Arc::ptr_eq(current, &slot));
            tracing::debug!("Room '{}' pruned", document_id);
        }

        removed
    }

    async fn leave_all(&self, connection_id: &ConnectionId) -> Vec<(DocumentId, Participant)> {
        let document_ids = self
            .memberships
            .get(connection_id)
            .map(|rooms| rooms.value().clone())
            .unwrap_or_default();

        let mut left = Vec::with_capacity(document_ids.len());
        for document_id in document_ids {
            if let Some(participant) = self.leave(&document_id, connection_id).await {
                left.push((document_id, participant));
            }
        }
        left
    }

    async fn list_participants(&self, document_id: &DocumentId) -> Vec<Participant> {
        let Some(slot) = self.slot(document_id) else {
            return Vec::new();
        };
        let guard = slot.lock().await;
        if guard.closed {
            return Vec::new();
        }
        guard.room.participants().to_vec()
    }

    async fn find_participant(
        &self,
        document_id: &DocumentId,
        connection_id: &ConnectionId,
    ) -> Option<Participant> {
        let slot = self.slot(document_id)?;
        let guard = slot.lock().await;
        if guard.closed {
            return None;
        }
        guard.room.find(connection_id).cloned()
    }

    async fn count_rooms(&self) -> usize {
        self.rooms.len()
    }
}
