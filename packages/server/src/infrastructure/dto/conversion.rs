//! Conversion logic between DTOs and domain entities.

use yoriai_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    Document, DocumentId, DomainError, Participant, RoomEvent, ShareGrant, UserId,
};
use crate::infrastructure::dto::{document::DocumentRecord, http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<DocumentRecord> for Document {
    type Error = DomainError;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DocumentId::new(record.id)?,
            title: record.title,
            owner_id: UserId::new(record.owner_id)?,
            collaborator_ids: record
                .collaborators
                .into_iter()
                .map(UserId::new)
                .collect::<Result<_, _>>()?,
            is_shared: record.is_shared,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Participant> for dto::UserInfo {
    fn from(model: Participant) -> Self {
        Self {
            socket_id: model.connection_id.as_str().to_string(),
            user_id: model.identity.user_id.into_string(),
            username: model.identity.username,
            joined_at: timestamp_to_rfc3339(model.joined_at.value()),
        }
    }
}

impl From<RoomEvent> for dto::ServerEvent {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::ConnectedUsers {
                document_id,
                participants,
            } => dto::ServerEvent::ConnectedUsers(dto::ConnectedUsersPayload {
                document: document_id.into_string(),
                users: participants.into_iter().map(Into::into).collect(),
            }),
            RoomEvent::UserConnected {
                participant,
                timestamp,
            } => dto::ServerEvent::UserConnected(dto::UserConnectedPayload {
                user: participant.into(),
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            }),
            RoomEvent::UserDisconnected {
                participant,
                timestamp,
            } => dto::ServerEvent::UserDisconnected(dto::UserDisconnectedPayload {
                socket_id: participant.connection_id.as_str().to_string(),
                user_id: participant.identity.user_id.into_string(),
                username: participant.identity.username,
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            }),
            RoomEvent::DocumentChanged {
                author,
                changes,
                timestamp,
            } => dto::ServerEvent::DocumentChange(dto::DocumentChangeBroadcast {
                changes,
                user_id: author.user_id.into_string(),
                username: author.username,
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            }),
            RoomEvent::UserTyping {
                author,
                is_typing,
                timestamp,
            } => dto::ServerEvent::UserTyping(dto::UserTypingBroadcast {
                user_id: author.user_id.into_string(),
                username: author.username,
                is_typing,
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            }),
            RoomEvent::CursorMoved {
                author,
                position,
                timestamp,
            } => dto::ServerEvent::CursorPosition(dto::CursorPositionBroadcast {
                user_id: author.user_id.into_string(),
                username: author.username,
                position,
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            }),
            RoomEvent::AuthError { message } => {
                dto::ServerEvent::AuthError(dto::ErrorPayload { message })
            }
            RoomEvent::Error { message } => dto::ServerEvent::Error(dto::ErrorPayload { message }),
        }
    }
}

impl From<ShareGrant> for http::ShareGrantInfo {
    fn from(model: ShareGrant) -> Self {
        Self {
            document_id: model.document_id.into_string(),
            user_id: model.subject.into_string(),
            granted_by: model.granted_by.into_string(),
            permission: model.permission.to_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}
