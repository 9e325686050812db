//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{CredentialError, DomainError, RepositoryError};

/// 協調編集セッション（WebSocket）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("authentication failed: {0}")]
    Unauthorized(#[from] CredentialError),

    #[error("document '{0}' not found")]
    DocumentNotFound(String),

    #[error("not joined to document '{0}'")]
    NotInRoom(String),

    #[error("insufficient permission on document '{0}'")]
    Forbidden(String),

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 共有（リンク・直接共有）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("authentication required")]
    Unauthorized,

    #[error("document '{0}' not found")]
    DocumentNotFound(String),

    #[error("share link not found or expired")]
    LinkNotFound,

    #[error("'{0}' has no share on this document")]
    GrantNotFound(String),

    #[error("insufficient permission on document '{0}'")]
    Forbidden(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<DomainError> for ShareError {
    fn from(e: DomainError) -> Self {
        ShareError::InvalidRequest(e.to_string())
    }
}
