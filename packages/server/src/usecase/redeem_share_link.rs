//! UseCase: 共有リンクの利用（ドキュメントへの参加）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RedeemShareLinkUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 利用によって Share Grant が付与され、既存の権限が引き下げられないことを保証
//! - 同じユーザーの再利用が冪等であることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回の利用、再利用
//! - 異常系：匿名ユーザー、失効済みのリンク
//! - エッジケース：既に高い権限を持つユーザーによる利用

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{
    DocumentId, Identity, Permission, ShareGrant, ShareGrantRepository, ShareLinkRepository,
    ShareToken, Timestamp,
};

use super::error::ShareError;

/// 利用結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub document_id: DocumentId,
    /// 利用後の実効的な Grant の権限
    pub permission: Permission,
}

/// 共有リンク利用のユースケース
pub struct RedeemShareLinkUseCase {
    links: Arc<dyn ShareLinkRepository>,
    grants: Arc<dyn ShareGrantRepository>,
    clock: Arc<dyn Clock>,
}

impl RedeemShareLinkUseCase {
    pub fn new(
        links: Arc<dyn ShareLinkRepository>,
        grants: Arc<dyn ShareGrantRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            links,
            grants,
            clock,
        }
    }

    /// 共有リンクを利用する
    ///
    /// リンクの利用記録と Grant の upsert はそれぞれアトミックで、どちらも単調に増えるだけなので
    /// 同じユーザーによる並行した利用も同じ結果に収束する。
    pub async fn execute(
        &self,
        token: &ShareToken,
        subject: &Identity,
    ) -> Result<Redemption, ShareError> {
        if subject.is_anonymous() {
            return Err(ShareError::Unauthorized);
        }

        let now = Timestamp::new(self.clock.now_millis());
        let link = self
            .links
            .record_redemption(token, subject.user_id.clone(), now)
            .await?
            .ok_or(ShareError::LinkNotFound)?;

        let grant = self
            .grants
            .upsert_max(ShareGrant::new(
                link.document_id.clone(),
                subject.user_id.clone(),
                link.created_by.clone(),
                link.permission,
                now,
            ))
            .await?;

        tracing::info!(
            "'{}' redeemed a share link for '{}' ({})",
            subject.user_id,
            link.document_id,
            grant.permission
        );

        Ok(Redemption {
            document_id: link.document_id,
            permission: grant.permission,
        })
    }
}
