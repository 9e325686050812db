//! ドメイン層
//!
//! Value Object、Entity、ドメインイベント、および Infrastructure 層が実装する trait を定義します。

pub mod connection_counter;
pub mod credential;
pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use connection_counter::{ConnectionCounter, ConnectionGuard};
pub use credential::CredentialVerifier;
pub use entity::{
    ANONYMOUS_USERNAME, ConnectionContext, Document, Identity, Participant, Room, RoomSnapshot,
    ShareGrant, ShareLink,
};
pub use error::{CredentialError, DomainError, MessagePushError, RepositoryError};
pub use event::RoomEvent;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{
    DocumentStore, JoinedRoom, RoomRepository, ShareGrantRepository, ShareLinkRepository,
};
pub use value_object::{
    ConnectionId, DocumentId, LinkTtl, Permission, ShareToken, Timestamp, UserId,
};

#[cfg(test)]
pub use credential::MockCredentialVerifier;
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
#[cfg(test)]
pub use repository::{
    MockDocumentStore, MockRoomRepository, MockShareGrantRepository, MockShareLinkRepository,
};
