//! UseCase: 実効権限の解決
//!
//! ## ルール
//!
//! 1. ドキュメントのオーナー → `Admin`
//! 2. (ドキュメント, ユーザー) の Share Grant がある → その権限
//! 3. それ以外 → 権限なし（`None`）
//!
//! ドキュメントの `collaborator_ids` と `is_shared` は判定に使いません。
//! 匿名 Identity は常に権限なしです。
//!
//! ドキュメントの存在確認は呼び出し側が Document Store で行います（存在しない場合は
//! not-found、権限がない場合は forbidden と区別するため）。

use std::sync::Arc;

use crate::domain::{Document, Identity, Permission, RepositoryError, ShareGrantRepository};

pub struct PermissionResolver {
    grants: Arc<dyn ShareGrantRepository>,
}

impl PermissionResolver {
    pub fn new(grants: Arc<dyn ShareGrantRepository>) -> Self {
        Self { grants }
    }

    /// 取得済みのドキュメントに対する実効権限を解決する
    pub async fn resolve_for(
        &self,
        document: &Document,
        identity: &Identity,
    ) -> Result<Option<Permission>, RepositoryError> {
        if identity.is_anonymous() {
            return Ok(None);
        }
        if document.owner_id == identity.user_id {
            return Ok(Some(Permission::Admin));
        }
        let grant = self.grants.find(&document.id, &identity.user_id).await?;
        Ok(grant.map(|g| g.permission))
    }
}
