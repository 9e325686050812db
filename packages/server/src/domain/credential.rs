//! Credential 検証の抽象化

use super::{CredentialError, Identity};

/// Credential（ベアラートークン）を検証して Identity を返す
///
/// 状態を持たず、同じ入力には同じ結果を返す。
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<Identity, CredentialError>;
}
