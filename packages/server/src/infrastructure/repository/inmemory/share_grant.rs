//! InMemory Share Grant Repository 実装

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::{
    DocumentId, Permission, RepositoryError, ShareGrant, ShareGrantRepository, UserId,
};

/// インメモリ Share Grant Repository 実装
///
/// Key: (document_id, subject)
#[derive(Default)]
pub struct InMemoryShareGrantRepository {
    grants: DashMap<(DocumentId, UserId), ShareGrant>,
}

impl InMemoryShareGrantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareGrantRepository for InMemoryShareGrantRepository {
    async fn find(
        &self,
        document_id: &DocumentId,
        subject: &UserId,
    ) -> Result<Option<ShareGrant>, RepositoryError> {
        let key = (document_id.clone(), subject.clone());
        Ok(self.grants.get(&key).map(|grant| grant.value().clone()))
    }

    async fn upsert_max(&self, grant: ShareGrant) -> Result<ShareGrant, RepositoryError> {
        let key = (grant.document_id.clone(), grant.subject.clone());
        // entry はシャードのロックを保持するため、読み取りと更新がアトミックになる
        let stored = match self.grants.entry(key) {
            Entry::Occupied(mut entry) => {
                if entry.get_mut().upgrade(grant.permission) {
                    tracing::debug!(
                        "Share grant for '{}' on '{}' upgraded to {}",
                        grant.subject,
                        grant.document_id,
                        grant.permission
                    );
                }
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(grant).value().clone(),
        };
        Ok(stored)
    }

    async fn set_permission(
        &self,
        document_id: &DocumentId,
        subject: &UserId,
        permission: Permission,
    ) -> Result<Option<ShareGrant>, RepositoryError> {
        let key = (document_id.clone(), subject.clone());
        Ok(self.grants.get_mut(&key).map(|mut grant| {
            grant.permission = permission;
            grant.clone()
        }))
    }

    async fn remove(
        &self,
        document_id: &DocumentId,
        subject: &UserId,
    ) -> Result<Option<ShareGrant>, RepositoryError> {
        let key = (document_id.clone(), subject.clone());
        Ok(self.grants.remove(&key).map(|(_, grant)| grant))
    }

    async fn list_for_document(
        &self,
        document_id: &DocumentId,
    ) -> Result<Vec<ShareGrant>, RepositoryError> {
        let mut grants: Vec<ShareGrant> = self
            .grants
            .iter()
            .filter(|entry| &entry.key().0 == document_id)
            .map(|entry| entry.value().clone())
            .collect();
        grants.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.subject.cmp(&b.subject))
        });
        Ok(grants)
    }
}
