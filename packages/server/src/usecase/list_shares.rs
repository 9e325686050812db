//! UseCase: ドキュメントの共有一覧
//!
//! オーナーのみが参照できる。

use std::sync::Arc;

use crate::domain::{DocumentId, DocumentStore, Identity, ShareGrant, ShareGrantRepository};

use super::error::ShareError;

pub struct ListSharesUseCase {
    documents: Arc<dyn DocumentStore>,
    grants: Arc<dyn ShareGrantRepository>,
}

impl ListSharesUseCase {
    pub fn new(documents: Arc<dyn DocumentStore>, grants: Arc<dyn ShareGrantRepository>) -> Self {
        Self { documents, grants }
    }

    /// 作成順の Share Grant 一覧を返す
    pub async fn execute(
        &self,
        requester: &Identity,
        document_id: &DocumentId,
    ) -> Result<Vec<ShareGrant>, ShareError> {
        if requester.is_anonymous() {
            return Err(ShareError::Unauthorized);
        }
        let document = self
            .documents
            .get_document(document_id)
            .await?
            .ok_or_else(|| ShareError::DocumentNotFound(document_id.to_string()))?;
        if document.owner_id != requester.user_id {
            return Err(ShareError::Forbidden(document_id.to_string()));
        }

        Ok(self.grants.list_for_document(document_id).await?)
    }
}
