//! UseCase: 共有の取り消し
//!
//! オーナーまたは admin 権限を持つユーザーが、指定したユーザーの Share Grant を削除する。
//! 参加中のルームでの権限は次回の参加時に反映される。

use std::sync::Arc;

use crate::domain::{
    DocumentId, DocumentStore, Identity, Permission, ShareGrant, ShareGrantRepository, UserId,
};

use super::{error::ShareError, permission::PermissionResolver};

pub struct RemoveShareUseCase {
    documents: Arc<dyn DocumentStore>,
    resolver: Arc<PermissionResolver>,
    grants: Arc<dyn ShareGrantRepository>,
}

impl RemoveShareUseCase {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        resolver: Arc<PermissionResolver>,
        grants: Arc<dyn ShareGrantRepository>,
    ) -> Self {
        Self {
            documents,
            resolver,
            grants,
        }
    }

    /// 削除した Grant を返す
    pub async fn execute(
        &self,
        requester: &Identity,
        document_id: &DocumentId,
        subject: &UserId,
    ) -> Result<ShareGrant, ShareError> {
        if requester.is_anonymous() {
            return Err(ShareError::Unauthorized);
        }
        let document = self
            .documents
            .get_document(document_id)
            .await?
            .ok_or_else(|| ShareError::DocumentNotFound(document_id.to_string()))?;
        let effective = self.resolver.resolve_for(&document, requester).await?;
        if !Permission::allows(effective, Permission::Admin) {
            return Err(ShareError::Forbidden(document_id.to_string()));
        }
        if *subject == document.owner_id {
            return Err(ShareError::InvalidRequest(
                "cannot remove the owner of a document".to_string(),
            ));
        }

        let removed = self
            .grants
            .remove(document_id, subject)
            .await?
            .ok_or_else(|| ShareError::GrantNotFound(subject.to_string()))?;

        tracing::info!(
            "'{}' removed the share of '{}' on '{}'",
            requester.user_id,
            subject,
            document_id
        );
        Ok(removed)
    }
}
