//! InMemory Document Store 実装
//!
//! ドキュメントのメタデータと、最後に記録された編集内容を保持します。

use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::{
    domain::{Document, DocumentId, DocumentStore, RepositoryError, Timestamp, UserId},
    infrastructure::dto::DocumentRecord,
};
use yoriai_shared::time::{Clock, SystemClock};

/// 記録済みの編集内容
#[derive(Debug, Clone, PartialEq)]
pub struct StoredContent {
    pub content: Map<String, Value>,
    pub last_edited_by: Option<UserId>,
    pub updated_at: Option<Timestamp>,
}

struct StoredDocument {
    document: Document,
    content: StoredContent,
}

/// インメモリ Document Store 実装
pub struct InMemoryDocumentStore {
    documents: DashMap<DocumentId, StoredDocument>,
    clock: Box<dyn Clock>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            documents: DashMap::new(),
            clock,
        }
    }

    /// JSON ファイル（ドキュメントの配列）から初期データを読み込む
    pub fn load_seed_file(&self, path: impl AsRef<Path>) -> Result<usize, RepositoryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::Unavailable(format!("failed to read {}: {e}", path.display()))
        })?;
        let records: Vec<DocumentRecord> = serde_json::from_str(&raw).map_err(|e| {
            RepositoryError::Unavailable(format!("failed to parse {}: {e}", path.display()))
        })?;

        let mut loaded = 0;
        for record in records {
            match Document::try_from(record) {
                Ok(document) => {
                    self.insert(document);
                    loaded += 1;
                }
                Err(e) => tracing::warn!("Skipping invalid document record: {}", e),
            }
        }
        Ok(loaded)
    }

    /// ドキュメントを登録する（既存の編集内容は保持しない）
    pub fn insert(&self, document: Document) {
        self.documents.insert(
            document.id.clone(),
            StoredDocument {
                document,
                content: StoredContent {
                    content: Map::new(),
                    last_edited_by: None,
                    updated_at: None,
                },
            },
        );
    }

    pub fn content(&self, document_id: &DocumentId) -> Option<StoredContent> {
        self.documents
            .get(document_id)
            .map(|stored| stored.content.clone())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<Document>, RepositoryError> {
        Ok(self
            .documents
            .get(document_id)
            .map(|stored| stored.document.clone()))
    }

    async fn record_change(
        &self,
        document_id: &DocumentId,
        changes: &Value,
        user_id: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut stored = self
            .documents
            .get_mut(document_id)
            .ok_or_else(|| RepositoryError::DocumentNotFound(document_id.to_string()))?;

        // オブジェクトはフィールド単位でマージ、それ以外は content キーに置く
        match changes {
            Value::Object(fields) => {
                for (key, value) in fields {
                    stored.content.content.insert(key.clone(), value.clone());
                }
            }
            other => {
                stored
                    .content
                    .content
                    .insert("content".to_string(), other.clone());
            }
        }
        stored.content.last_edited_by = Some(user_id.clone());
        stored.content.updated_at = Some(Timestamp::new(self.clock.now_millis()));

        Ok(())
    }
}
