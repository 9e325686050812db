//! Credential extraction.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::{domain::Identity, ui::state::AppState};

use super::error::ApiError;

/// `Authorization: Bearer <token>` ヘッダーからトークンを取り出す
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// 認証必須のエンドポイント用
pub struct AuthenticatedUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Access token not provided"))?;
        state.verifier.verify(&token).map(Self).map_err(|e| {
            tracing::warn!("Rejected bearer credential: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })
    }
}

/// 認証が任意のエンドポイント用（無効な credential は匿名として扱う）
pub struct OptionalUser(pub Option<Identity>);

impl FromRequestParts<Arc<AppState>> for OptionalUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let identity = bearer_token(&parts.headers).and_then(|token| {
            state
                .verifier
                .verify(&token)
                .inspect_err(|e| tracing::debug!("Ignoring rejected bearer credential: {}", e))
                .ok()
        });
        Ok(Self(identity))
    }
}
