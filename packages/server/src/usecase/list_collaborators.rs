//! UseCase: 共同編集者の一覧
//!
//! オーナーと Share Grant を持つユーザーを、ルームへの接続状況（オンライン / オフライン）と共に返す。

use std::{collections::HashMap, sync::Arc};

use crate::domain::{
    DocumentId, DocumentStore, Identity, Permission, RoomRepository, ShareGrantRepository, UserId,
};

use super::{error::ShareError, permission::PermissionResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorRole {
    Owner,
    Collaborator,
}

impl CollaboratorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorRole::Owner => "owner",
            CollaboratorRole::Collaborator => "collaborator",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collaborator {
    pub user_id: UserId,
    /// ルームに参加中ならその表示名、そうでなければユーザー ID
    pub name: String,
    pub role: CollaboratorRole,
    pub permission: Permission,
    pub online: bool,
}

pub struct ListCollaboratorsUseCase {
    documents: Arc<dyn DocumentStore>,
    resolver: Arc<PermissionResolver>,
    grants: Arc<dyn ShareGrantRepository>,
    rooms: Arc<dyn RoomRepository>,
}

impl ListCollaboratorsUseCase {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        resolver: Arc<PermissionResolver>,
        grants: Arc<dyn ShareGrantRepository>,
        rooms: Arc<dyn RoomRepository>,
    ) -> Self {
        Self {
            documents,
            resolver,
            grants,
            rooms,
        }
    }

    /// 一覧を取得する（閲覧には読み取り権限以上が必要）
    pub async fn execute(
        &self,
        requester: &Identity,
        document_id: &DocumentId,
    ) -> Result<Vec<Collaborator>, ShareError> {
        if requester.is_anonymous() {
            return Err(ShareError::Unauthorized);
        }
        let document = self
            .documents
            .get_document(document_id)
            .await?
            .ok_or_else(|| ShareError::DocumentNotFound(document_id.to_string()))?;
        let effective = self.resolver.resolve_for(&document, requester).await?;
        if !Permission::allows(effective, Permission::Read) {
            return Err(ShareError::Forbidden(document_id.to_string()));
        }

        // 参加中の認証済みユーザーの表示名
        let online: HashMap<UserId, String> = self
            .rooms
            .list_participants(document_id)
            .await
            .into_iter()
            .filter(|p| p.identity.is_durable())
            .map(|p| (p.identity.user_id, p.identity.username))
            .collect();

        let entry = |user_id: UserId, role: CollaboratorRole, permission: Permission| {
            let name = online
                .get(&user_id)
                .cloned()
                .unwrap_or_else(|| user_id.to_string());
            Collaborator {
                online: online.contains_key(&user_id),
                user_id,
                name,
                role,
                permission,
            }
        };

        let mut collaborators = vec![entry(
            document.owner_id.clone(),
            CollaboratorRole::Owner,
            Permission::Admin,
        )];
        for grant in self.grants.list_for_document(document_id).await? {
            if grant.subject == document.owner_id {
                continue;
            }
            collaborators.push(entry(
                grant.subject,
                CollaboratorRole::Collaborator,
                grant.permission,
            ));
        }
        Ok(collaborators)
    }
}
