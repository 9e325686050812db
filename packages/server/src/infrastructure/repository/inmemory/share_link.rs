//! InMemory Share Link Repository 実装
//!
//! 失効は参照時に判定します（遅延失効）。失効済みのリンクは `purge_expired` で削除されるまで残ります。

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::{
    RepositoryError, ShareLink, ShareLinkRepository, ShareToken, Timestamp, UserId,
};

/// インメモリ Share Link Repository 実装
#[derive(Default)]
pub struct InMemoryShareLinkRepository {
    links: DashMap<ShareToken, ShareLink>,
}

impl InMemoryShareLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 失効済みを含む全件数
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl ShareLinkRepository for InMemoryShareLinkRepository {
    async fn insert(&self, link: ShareLink) -> Result<(), RepositoryError> {
        match self.links.entry(link.token.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(
                "share token already issued".to_string(),
            )),
            Entry::Vacant(entry) => {
                entry.insert(link);
                Ok(())
            }
        }
    }

    async fn find_active(
        &self,
        token: &ShareToken,
        now: Timestamp,
    ) -> Result<Option<ShareLink>, RepositoryError> {
        Ok(self
            .links
            .get(token)
            .filter(|link| !link.is_expired(now))
            .map(|link| link.value().clone()))
    }

    async fn record_view(
        &self,
        token: &ShareToken,
        viewer: Option<UserId>,
        now: Timestamp,
    ) -> Result<Option<ShareLink>, RepositoryError> {
        let Some(mut link) = self.links.get_mut(token) else {
            return Ok(None);
        };
        if link.is_expired(now) {
            return Ok(None);
        }
        link.record_view(viewer.as_ref());
        Ok(Some(link.value().clone()))
    }

    async fn record_redemption(
        &self,
        token: &ShareToken,
        user_id: UserId,
        now: Timestamp,
    ) -> Result<Option<ShareLink>, RepositoryError> {
        let Some(mut link) = self.links.get_mut(token) else {
            return Ok(None);
        };
        if link.is_expired(now) {
            return Ok(None);
        }
        link.record_redemption(&user_id);
        Ok(Some(link.value().clone()))
    }

    async fn purge_expired(&self, now: Timestamp) -> Result<usize, RepositoryError> {
        let before = self.links.len();
        self.links.retain(|_, link| !link.is_expired(now));
        Ok(before.saturating_sub(self.links.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentId, Permission};

    fn link(token: &str, expires_at: i64) -> ShareLink {
        ShareLink::new(
            ShareToken::new(token.to_string()).unwrap(),
            DocumentId::new("doc-1".to_string()).unwrap(),
            UserId::new("alice".to_string()).unwrap(),
            Permission::Write,
            Timestamp::new(0),
            Timestamp::new(expires_at),
        )
    }

    fn token(value: &str) -> ShareToken {
        ShareToken::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_token() {
        // テスト項目: 同じトークンの二重登録はエラーになる
        // given (前提条件):
        let repository = InMemoryShareLinkRepository::new();
        repository.insert(link("t1", 100)).await.unwrap();

        // when (操作):
        let result = repository.insert(link("t1", 200)).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_expired_link_is_not_found() {
        // テスト項目: 失効済みのリンクは参照・利用できない
        // given (前提条件):
        let repository = InMemoryShareLinkRepository::new();
        repository.insert(link("t1", 100)).await.unwrap();
        let now = Timestamp::new(101);

        // when (操作):
        let found = repository.find_active(&token("t1"), now).await.unwrap();
        let viewed = repository
            .record_view(&token("t1"), None, now)
            .await
            .unwrap();
        let redeemed = repository
            .record_redemption(&token("t1"), UserId::new("bob".to_string()).unwrap(), now)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(found.is_none());
        assert!(viewed.is_none());
        assert!(redeemed.is_none());
    }

    #[tokio::test]
    async fn test_find_active_has_no_side_effects() {
        // テスト項目: 参照のみでは利用回数が変わらない
        // given (前提条件):
        let repository = InMemoryShareLinkRepository::new();
        repository.insert(link("t1", 100)).await.unwrap();

        // when (操作):
        repository
            .find_active(&token("t1"), Timestamp::new(1))
            .await
            .unwrap();
        let found = repository
            .find_active(&token("t1"), Timestamp::new(2))
            .await
            .unwrap()
            .unwrap();

        // then (期待する結果):
        assert_eq!(found.access_count, 0);
    }

    #[tokio::test]
    async fn test_purge_expired_removes_only_expired() {
        // テスト項目: 失効済みのリンクのみが削除される
        // given (前提条件):
        let repository = InMemoryShareLinkRepository::new();
        repository.insert(link("old", 100)).await.unwrap();
        repository.insert(link("fresh", 1_000)).await.unwrap();

        // when (操作):
        let purged = repository.purge_expired(Timestamp::new(100)).await.unwrap();

        // then (期待する結果):
        assert_eq!(purged, 1);
        assert_eq!(repository.len(), 1);
        assert!(
            repository
                .find_active(&token("fresh"), Timestamp::new(100))
                .await
                .unwrap()
                .is_some()
        );
    }
}
