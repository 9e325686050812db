//! Server state and dependency wiring.

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::{
    domain::{
        ConnectionCounter, CredentialVerifier, DocumentStore, LinkTtl, MessagePusher,
        RoomRepository, ShareGrantRepository, ShareLinkRepository,
    },
    usecase::{
        ConnectParticipantUseCase, CreateShareLinkUseCase, DisconnectParticipantUseCase,
        GetHealthUseCase, GetSharedDocumentUseCase, JoinDocumentUseCase, LeaveDocumentUseCase,
        ListCollaboratorsUseCase, ListSharesUseCase, PermissionResolver, PurgeExpiredLinksUseCase,
        RedeemShareLinkUseCase, RelayEventUseCase, RemoveShareUseCase, ShareDocumentUseCase,
        UpdateSharePermissionUseCase,
    },
};

/// Infrastructure の実装一式
///
/// バイナリと結合テストの双方がこれを組み立てて [`AppState::new`] に渡す。
#[derive(Clone)]
pub struct AppDependencies {
    pub rooms: Arc<dyn RoomRepository>,
    pub documents: Arc<dyn DocumentStore>,
    pub grants: Arc<dyn ShareGrantRepository>,
    pub links: Arc<dyn ShareLinkRepository>,
    pub message_pusher: Arc<dyn MessagePusher>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub counter: Arc<ConnectionCounter>,
    pub clock: Arc<dyn Clock>,
}

/// 実行時の設定値
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// 共有 URL のベース（`{base}/share/{token}`）
    pub frontend_url: String,
    pub default_link_ttl: LinkTtl,
    /// 接続ごとの送信キューの容量
    pub outbound_queue_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            frontend_url: "https://document-app.com".to_string(),
            default_link_ttl: LinkTtl::default(),
            outbound_queue_capacity: 256,
        }
    }
}

impl ServerSettings {
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/share/{}", self.frontend_url.trim_end_matches('/'), token)
    }
}

/// Shared application state
pub struct AppState {
    pub settings: ServerSettings,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub message_pusher: Arc<dyn MessagePusher>,

    // WebSocket
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub join_document_usecase: Arc<JoinDocumentUseCase>,
    pub leave_document_usecase: Arc<LeaveDocumentUseCase>,
    pub relay_event_usecase: Arc<RelayEventUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,

    // HTTP
    pub create_share_link_usecase: Arc<CreateShareLinkUseCase>,
    pub get_shared_document_usecase: Arc<GetSharedDocumentUseCase>,
    pub redeem_share_link_usecase: Arc<RedeemShareLinkUseCase>,
    pub share_document_usecase: Arc<ShareDocumentUseCase>,
    pub list_collaborators_usecase: Arc<ListCollaboratorsUseCase>,
    pub list_shares_usecase: Arc<ListSharesUseCase>,
    pub remove_share_usecase: Arc<RemoveShareUseCase>,
    pub update_share_permission_usecase: Arc<UpdateSharePermissionUseCase>,
    pub get_health_usecase: Arc<GetHealthUseCase>,

    // Background
    pub purge_expired_links_usecase: Arc<PurgeExpiredLinksUseCase>,
}

impl AppState {
    pub fn new(deps: AppDependencies, settings: ServerSettings) -> Self {
        let AppDependencies {
            rooms,
            documents,
            grants,
            links,
            message_pusher,
            verifier,
            counter,
            clock,
        } = deps;

        let resolver = Arc::new(PermissionResolver::new(grants.clone()));

        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                verifier.clone(),
                message_pusher.clone(),
                counter.clone(),
                clock.clone(),
            )),
            join_document_usecase: Arc::new(JoinDocumentUseCase::new(
                verifier.clone(),
                documents.clone(),
                resolver.clone(),
                rooms.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            leave_document_usecase: Arc::new(LeaveDocumentUseCase::new(
                rooms.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            relay_event_usecase: Arc::new(RelayEventUseCase::new(
                rooms.clone(),
                documents.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                rooms.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            create_share_link_usecase: Arc::new(CreateShareLinkUseCase::new(
                documents.clone(),
                resolver.clone(),
                links.clone(),
                clock.clone(),
            )),
            get_shared_document_usecase: Arc::new(GetSharedDocumentUseCase::new(
                links.clone(),
                documents.clone(),
                clock.clone(),
            )),
            redeem_share_link_usecase: Arc::new(RedeemShareLinkUseCase::new(
                links.clone(),
                grants.clone(),
                clock.clone(),
            )),
            share_document_usecase: Arc::new(ShareDocumentUseCase::new(
                documents.clone(),
                resolver.clone(),
                grants.clone(),
                clock.clone(),
            )),
            list_shares_usecase: Arc::new(ListSharesUseCase::new(documents.clone(), grants.clone())),
            remove_share_usecase: Arc::new(RemoveShareUseCase::new(
                documents.clone(),
                resolver.clone(),
                grants.clone(),
            )),
            update_share_permission_usecase: Arc::new(UpdateSharePermissionUseCase::new(
                documents.clone(),
                resolver.clone(),
                grants.clone(),
            )),
            list_collaborators_usecase: Arc::new(ListCollaboratorsUseCase::new(
                documents,
                resolver,
                grants,
                rooms.clone(),
            )),
            get_health_usecase: Arc::new(GetHealthUseCase::new(counter, rooms, clock.clone())),
            purge_expired_links_usecase: Arc::new(PurgeExpiredLinksUseCase::new(links, clock)),
            settings,
            verifier,
            message_pusher,
        }
    }
}
