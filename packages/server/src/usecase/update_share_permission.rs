//! UseCase: 共有権限の変更
//!
//! 直接共有やリンクの利用は権限を引き上げるのみだが、この操作は指定した権限に置き換える
//! （引き下げも行う）。オーナーまたは admin 権限を持つユーザーのみが実行できる。

use std::sync::Arc;

use crate::domain::{
    DocumentId, DocumentStore, Identity, Permission, ShareGrant, ShareGrantRepository, UserId,
};

use super::{error::ShareError, permission::PermissionResolver};

pub struct UpdateSharePermissionUseCase {
    documents: Arc<dyn DocumentStore>,
    resolver: Arc<PermissionResolver>,
    grants: Arc<dyn ShareGrantRepository>,
}

impl UpdateSharePermissionUseCase {
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

    pub async fn execute(
        &self,
        requester: &Identity,
        document_id: &DocumentId,
        subject: &UserId,
        permission: Permission,
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
                "cannot change the permission of the owner".to_string(),
            ));
        }

        let updated = self
            .grants
            .set_permission(document_id, subject, permission)
            .await?
            .ok_or_else(|| ShareError::GrantNotFound(subject.to_string()))?;

        tracing::info!(
            "'{}' set the permission of '{}' on '{}' to {}",
            requester.user_id,
            subject,
            document_id,
            permission
        );
        Ok(updated)
    }
}
