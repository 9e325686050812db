//! UseCase: ユーザーへの直接共有

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{
    DocumentId, DocumentStore, Identity, Permission, ShareGrant, ShareGrantRepository, Timestamp,
    UserId,
};

use super::{error::ShareError, permission::PermissionResolver};

/// 直接共有のユースケース
///
/// オーナーまたは admin 権限を持つユーザーが、指定したユーザーに権限を付与する。
/// 既存の Grant の権限は引き下げない。
pub struct ShareDocumentUseCase {
    documents: Arc<dyn DocumentStore>,
    resolver: Arc<PermissionResolver>,
    grants: Arc<dyn ShareGrantRepository>,
    clock: Arc<dyn Clock>,
}

impl ShareDocumentUseCase {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        resolver: Arc<PermissionResolver>,
        grants: Arc<dyn ShareGrantRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            resolver,
            grants,
            clock,
        }
    }

    pub async fn execute(
        &self,
        issuer: &Identity,
        document_id: &DocumentId,
        subject: UserId,
        permission: Permission,
    ) -> Result<ShareGrant, ShareError> {
        if issuer.is_anonymous() {
            return Err(ShareError::Unauthorized);
        }

        let document = self
            .documents
            .get_document(document_id)
            .await?
            .ok_or_else(|| ShareError::DocumentNotFound(document_id.to_string()))?;
        let effective = self.resolver.resolve_for(&document, issuer).await?;
        if !Permission::allows(effective, Permission::Admin) {
            return Err(ShareError::Forbidden(document_id.to_string()));
        }
        if subject == document.owner_id {
            return Err(ShareError::InvalidRequest(
                "cannot share a document with its owner".to_string(),
            ));
        }

        let grant = self
            .grants
            .upsert_max(ShareGrant::new(
                document_id.clone(),
                subject,
                issuer.user_id.clone(),
                permission,
                Timestamp::new(self.clock.now_millis()),
            ))
            .await?;

        tracing::info!(
            "'{}' shared '{}' with '{}' ({})",
            issuer.user_id,
            document_id,
            grant.subject,
            grant.permission
        );
        Ok(grant)
    }
}
