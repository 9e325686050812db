//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object の生成・検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid permission '{0}' (expected read, write or admin)")]
    InvalidPermission(String),

    #[error("invalid duration '{0}'")]
    InvalidTtl(String),
}

/// Repository（データストア）のエラー
///
/// 永続化の失敗は一時的なものとして扱い、対話的な経路を失敗させない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("document '{0}' not found")]
    DocumentNotFound(String),

    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// MessagePusher（メッセージ通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("outbound queue of connection '{0}' is full")]
    QueueFull(String),

    #[error("connection '{0}' is closed")]
    Closed(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}

/// Credential 検証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("credential is invalid: {0}")]
    Invalid(String),

    #[error("credential has expired")]
    Expired,

    #[error("credential verification is not configured")]
    NotConfigured,
}
