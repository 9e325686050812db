//! UseCase 層
//!
//! 1 つの操作につき 1 つのユースケースを定義します。ユースケースはドメイン層の trait にのみ依存します。

pub mod connect_participant;
pub mod create_share_link;
pub mod disconnect_participant;
pub mod error;
pub mod get_health;
pub mod get_shared_document;
pub mod join_document;
pub mod leave_document;
pub mod list_collaborators;
pub mod list_shares;
pub mod permission;
pub mod purge_expired_links;
pub mod redeem_share_link;
pub mod relay_event;
pub mod remove_share;
pub mod share_document;
pub mod update_share_permission;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_participant::{ConnectParticipantUseCase, ConnectedParticipant};
pub use create_share_link::CreateShareLinkUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{SessionError, ShareError};
pub use get_health::{GetHealthUseCase, HealthReport};
pub use get_shared_document::{GetSharedDocumentUseCase, SharedDocument};
pub use join_document::JoinDocumentUseCase;
pub use leave_document::LeaveDocumentUseCase;
pub use list_collaborators::{Collaborator, CollaboratorRole, ListCollaboratorsUseCase};
pub use list_shares::ListSharesUseCase;
pub use permission::PermissionResolver;
pub use purge_expired_links::PurgeExpiredLinksUseCase;
pub use redeem_share_link::{RedeemShareLinkUseCase, Redemption};
pub use relay_event::RelayEventUseCase;
pub use remove_share::RemoveShareUseCase;
pub use share_document::ShareDocumentUseCase;
pub use update_share_permission::UpdateSharePermissionUseCase;
