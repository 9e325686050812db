//! Share link and direct share endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};

use crate::{
    domain::{DocumentId, LinkTtl, Permission, ShareToken, UserId},
    infrastructure::dto::http::{
        CollaboratorInfo, CollaboratorsResponse, CreateShareLinkRequest, CreateShareLinkResponse,
        RedeemShareLinkRequest, RedeemShareLinkResponse, RemoveShareResponse,
        ShareDocumentRequest, ShareDocumentResponse, ShareListResponse, SharedDocumentResponse,
        UpdateSharePermissionRequest,
    },
    ui::state::AppState,
};
use yoriai_shared::time::timestamp_to_rfc3339;

use super::{
    auth::{AuthenticatedUser, OptionalUser},
    error::{ApiError, parse_body},
};

fn parse_permission(value: Option<&str>) -> Result<Permission, ApiError> {
    Ok(value
        .map(str::parse::<Permission>)
        .transpose()?
        .unwrap_or(Permission::Read))
}

/// POST /api/share/document/{document_id}/generate-link
pub async fn create_share_link(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    AuthenticatedUser(issuer): AuthenticatedUser,
    body: Bytes,
) -> Result<Json<CreateShareLinkResponse>, ApiError> {
    let request: CreateShareLinkRequest = parse_body(&body)?;
    let permission = parse_permission(request.permission.as_deref())?;
    let ttl = match request.expires_in.as_deref() {
        Some(raw) => raw.parse::<LinkTtl>()?,
        None => state.settings.default_link_ttl,
    };
    let document_id = DocumentId::new(document_id)?;

    let link = state
        .create_share_link_usecase
        .execute(&issuer, &document_id, permission, ttl)
        .await?;

    Ok(Json(CreateShareLinkResponse {
        success: true,
        share_url: state.settings.share_url(link.token.as_str()),
        share_token: link.token.as_str().to_string(),
        permission: link.permission.to_string(),
        expires_at: timestamp_to_rfc3339(link.expires_at.value()),
    }))
}

/// GET /api/share/link/{token}
pub async fn get_shared_document(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    OptionalUser(viewer): OptionalUser,
) -> Result<Json<SharedDocumentResponse>, ApiError> {
    let token = ShareToken::new(token)?;
    let shared = state
        .get_shared_document_usecase
        .execute(&token, viewer.as_ref())
        .await?;

    Ok(Json(SharedDocumentResponse {
        success: true,
        document_id: shared.document.id.into_string(),
        title: shared.document.title,
        permission: shared.permission.to_string(),
    }))
}

/// POST /api/share/join-by-token
pub async fn redeem_share_link(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(subject): AuthenticatedUser,
    body: Bytes,
) -> Result<Json<RedeemShareLinkResponse>, ApiError> {
    let request: RedeemShareLinkRequest = parse_body(&body)?;
    let token = request
        .share_token
        .ok_or_else(|| ApiError::bad_request("Share token is required"))?;
    let token = ShareToken::new(token)?;

    let redemption = state
        .redeem_share_link_usecase
        .execute(&token, &subject)
        .await?;

    Ok(Json(RedeemShareLinkResponse {
        success: true,
        document_id: redemption.document_id.into_string(),
        permission: redemption.permission.to_string(),
        message: "Access to the document granted".to_string(),
    }))
}

/// POST /api/share/{document_id}/collaborators
pub async fn share_document(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    AuthenticatedUser(issuer): AuthenticatedUser,
    body: Bytes,
) -> Result<Json<ShareDocumentResponse>, ApiError> {
    let request: ShareDocumentRequest = parse_body(&body)?;
    let subject = request
        .user_id
        .ok_or_else(|| ApiError::bad_request("User id is required"))?;
    let subject = UserId::new(subject)?;
    let permission = parse_permission(request.permission.as_deref())?;
    let document_id = DocumentId::new(document_id)?;

    let grant = state
        .share_document_usecase
        .execute(&issuer, &document_id, subject, permission)
        .await?;

    Ok(Json(ShareDocumentResponse {
        success: true,
        message: "Document shared successfully".to_string(),
        share: grant.into(),
    }))
}

/// GET /api/share/{document_id}/collaborators
pub async fn list_collaborators(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    AuthenticatedUser(requester): AuthenticatedUser,
) -> Result<Json<CollaboratorsResponse>, ApiError> {
    let document_id = DocumentId::new(document_id)?;
    let collaborators = state
        .list_collaborators_usecase
        .execute(&requester, &document_id)
        .await?;

    let data = collaborators
        .into_iter()
        .map(|c| CollaboratorInfo {
            id: c.user_id.into_string(),
            name: c.name,
            role: c.role.as_str().to_string(),
            permission: c.permission.to_string(),
            status: if c.online { "online" } else { "offline" }.to_string(),
        })
        .collect();

    Ok(Json(CollaboratorsResponse {
        success: true,
        data,
    }))
}

/// GET /api/share/{document_id}
pub async fn list_shares(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    AuthenticatedUser(requester): AuthenticatedUser,
) -> Result<Json<ShareListResponse>, ApiError> {
    let document_id = DocumentId::new(document_id)?;
    let shares = state
        .list_shares_usecase
        .execute(&requester, &document_id)
        .await?;

    Ok(Json(ShareListResponse {
        success: true,
        data: shares.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/share/{document_id}/{user_id}
/// PUT /api/share/{document_id}/collaborators/{user_id}
pub async fn update_share_permission(
    State(state): State<Arc<AppState>>,
    Path((document_id, user_id)): Path<(String, String)>,
    AuthenticatedUser(requester): AuthenticatedUser,
    body: Bytes,
) -> Result<Json<ShareDocumentResponse>, ApiError> {
    let request: UpdateSharePermissionRequest = parse_body(&body)?;
    let permission = request
        .permission
        .ok_or_else(|| ApiError::bad_request("Permission is required"))?
        .parse::<Permission>()?;
    let document_id = DocumentId::new(document_id)?;
    let subject = UserId::new(user_id)?;

    let grant = state
        .update_share_permission_usecase
        .execute(&requester, &document_id, &subject, permission)
        .await?;

    Ok(Json(ShareDocumentResponse {
        success: true,
        message: "Permission updated successfully".to_string(),
        share: grant.into(),
    }))
}

/// DELETE /api/share/{document_id}/{user_id}
/// DELETE /api/share/{document_id}/collaborators/{user_id}
pub async fn remove_share(
    State(state): State<Arc<AppState>>,
    Path((document_id, user_id)): Path<(String, String)>,
    AuthenticatedUser(requester): AuthenticatedUser,
) -> Result<Json<RemoveShareResponse>, ApiError> {
    let document_id = DocumentId::new(document_id)?;
    let subject = UserId::new(user_id)?;

    state
        .remove_share_usecase
        .execute(&requester, &document_id, &subject)
        .await?;

    Ok(Json(RemoveShareResponse {
        success: true,
        message: "Share removed successfully".to_string(),
    }))
}
