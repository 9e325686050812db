//! JWT（HS256）による CredentialVerifier 実装
//!
//! claims は `{ id, username, exp }`。署名鍵が設定されていない場合、全ての credential を拒否します。

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::domain::{CredentialError, CredentialVerifier, Identity, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub id: String,
    pub username: String,
    pub exp: u64,
}

pub struct JwtCredentialVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl JwtCredentialVerifier {
    pub fn new(secret: Option<&str>) -> Self {
        let key = secret
            .filter(|s| !s.is_empty())
            .map(|s| DecodingKey::from_secret(s.as_bytes()));
        if key.is_none() {
            tracing::warn!("JWT secret is not configured; all credentials will be rejected");
        }
        Self {
            key,
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl CredentialVerifier for JwtCredentialVerifier {
    fn verify(&self, credential: &str) -> Result<Identity, CredentialError> {
        let key = self.key.as_ref().ok_or(CredentialError::NotConfigured)?;

        let data = decode::<JwtClaims>(credential, key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Invalid(e.to_string()),
            }
        })?;

        let user_id = UserId::new(data.claims.id)
            .map_err(|e| CredentialError::Invalid(e.to_string()))?;
        Ok(Identity::authenticated(user_id, data.claims.username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret";

    fn token(id: &str, exp_offset_secs: i64, secret: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset_secs) as u64;
        let claims = JwtClaims {
            id: id.to_string(),
            username: format!("{id}-name"),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        // テスト項目: 正しい署名の token から Identity を得られる
        // given (前提条件):
        let verifier = JwtCredentialVerifier::new(Some(SECRET));

        // when (操作):
        let identity = verifier.verify(&token("u1", 3600, SECRET)).unwrap();

        // then (期待する結果):
        assert_eq!(identity.user_id.as_str(), "u1");
        assert_eq!(identity.username, "u1-name");
        assert!(identity.is_durable());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        // テスト項目: 期限切れの token は Expired で拒否される
        // given (前提条件):
        let verifier = JwtCredentialVerifier::new(Some(SECRET));

        // when (操作):
        let result = verifier.verify(&token("u1", -3600, SECRET));

        // then (期待する結果):
        assert_eq!(result, Err(CredentialError::Expired));
    }

    #[test]
    fn test_verify_rejects_wrong_signature() {
        // テスト項目: 別の鍵で署名された token は拒否される
        // given (前提条件):
        let verifier = JwtCredentialVerifier::new(Some(SECRET));

        // when (操作):
        let result = verifier.verify(&token("u1", 3600, "other-secret"));

        // then (期待する結果):
        assert!(matches!(result, Err(CredentialError::Invalid(_))));
    }

    #[test]
    fn test_verify_without_secret_rejects_everything() {
        // テスト項目: 鍵が未設定なら全て拒否される
        // given (前提条件):
        let verifier = JwtCredentialVerifier::new(None);

        // when (操作):
        let result = verifier.verify(&token("u1", 3600, SECRET));

        // then (期待する結果):
        assert_eq!(result, Err(CredentialError::NotConfigured));
    }
}
