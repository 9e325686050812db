//! Credential 検証の実装

pub mod jwt;

pub use jwt::{JwtClaims, JwtCredentialVerifier};
