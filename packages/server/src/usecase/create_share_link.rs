//! UseCase: 共有リンクの発行
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateShareLinkUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 書き込み権限以上のユーザーのみがリンクを発行できることを保証
//! - 有効期限が発行時刻 + 有効期間になることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：オーナー、書き込み権限のあるユーザーによる発行
//! - 異常系：匿名、読み取り権限のみ、存在しないドキュメント

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{
    DocumentId, DocumentStore, Identity, LinkTtl, Permission, RepositoryError, ShareLink,
    ShareLinkRepository, ShareToken, Timestamp,
};

use super::{error::ShareError, permission::PermissionResolver};

/// トークン衝突時の再試行回数
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// 共有リンク発行のユースケース
pub struct CreateShareLinkUseCase {
    documents: Arc<dyn DocumentStore>,
    resolver: Arc<PermissionResolver>,
    links: Arc<dyn ShareLinkRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateShareLinkUseCase {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        resolver: Arc<PermissionResolver>,
        links: Arc<dyn ShareLinkRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            resolver,
            links,
            clock,
        }
    }

    /// 共有リンクを発行する
    ///
    /// # Arguments
    ///
    /// * `issuer` - 発行者。ドキュメントに対して書き込み権限以上が必要
    /// * `permission` - リンクで付与する権限
    /// * `ttl` - 有効期間
    pub async fn execute(
        &self,
        issuer: &Identity,
        document_id: &DocumentId,
        permission: Permission,
        ttl: LinkTtl,
    ) -> Result<ShareLink, ShareError> {
        if issuer.is_anonymous() {
            return Err(ShareError::Unauthorized);
        }

        let document = self
            .documents
            .get_document(document_id)
            .await?
            .ok_or_else(|| ShareError::DocumentNotFound(document_id.to_string()))?;
        let effective = self.resolver.resolve_for(&document, issuer).await?;
        if !Permission::allows(effective, Permission::Write) {
            return Err(ShareError::Forbidden(document_id.to_string()));
        }

        let created_at = Timestamp::new(self.clock.now_millis());
        let expires_at = created_at.add_millis(ttl.as_millis());

        let mut attempts = 0;
        loop {
            attempts += 1;
            let link = ShareLink::new(
                ShareToken::generate(),
                document_id.clone(),
                issuer.user_id.clone(),
                permission,
                created_at,
                expires_at,
            );
            match self.links.insert(link.clone()).await {
                Ok(()) => {
                    tracing::info!(
                        "Share link issued for '{}' by '{}' ({}, expires at {})",
                        document_id,
                        issuer.user_id,
                        permission,
                        expires_at.value()
                    );
                    return Ok(link);
                }
                Err(RepositoryError::Conflict(_)) if attempts < MAX_TOKEN_ATTEMPTS => {
                    tracing::warn!("Share token collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
