//! UseCase: 共有リンクからのドキュメント参照

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{
    Document, DocumentStore, Identity, Permission, ShareLinkRepository, ShareToken, Timestamp,
};

use super::error::ShareError;

/// リンク経由で参照したドキュメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedDocument {
    pub document: Document,
    /// リンクが付与する権限
    pub permission: Permission,
}

/// 共有リンク参照のユースケース
pub struct GetSharedDocumentUseCase {
    links: Arc<dyn ShareLinkRepository>,
    documents: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl GetSharedDocumentUseCase {
    pub fn new(
        links: Arc<dyn ShareLinkRepository>,
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            links,
            documents,
            clock,
        }
    }

    /// リンクが指すドキュメントを取得し、閲覧を記録する
    ///
    /// 閲覧者が認証済みの場合はリンクの利用者として記録する。
    pub async fn execute(
        &self,
        token: &ShareToken,
        viewer: Option<&Identity>,
    ) -> Result<SharedDocument, ShareError> {
        let viewer_id = viewer
            .filter(|identity| identity.is_durable())
            .map(|identity| identity.user_id.clone());

        let link = self
            .links
            .record_view(token, viewer_id, self.now())
            .await?
            .ok_or(ShareError::LinkNotFound)?;

        let document = self
            .documents
            .get_document(&link.document_id)
            .await?
            .ok_or_else(|| ShareError::DocumentNotFound(link.document_id.to_string()))?;

        Ok(SharedDocument {
            document,
            permission: link.permission,
        })
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}
