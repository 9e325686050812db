//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDetailsResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime: String,
    pub uptime_seconds: u64,
    pub active_connections: usize,
    pub total_connections: u64,
    pub active_rooms: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareLinkRequest {
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub expires_in: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareLinkResponse {
    pub success: bool,
    pub share_token: String,
    pub share_url: String,
    pub permission: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDocumentResponse {
    pub success: bool,
    pub document_id: String,
    pub title: String,
    pub permission: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemShareLinkRequest {
    #[serde(default)]
    pub share_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemShareLinkResponse {
    pub success: bool,
    pub document_id: String,
    pub permission: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareDocumentRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub permission: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareGrantInfo {
    pub document_id: String,
    pub user_id: String,
    pub granted_by: String,
    pub permission: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareDocumentResponse {
    pub success: bool,
    pub message: String,
    pub share: ShareGrantInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSharePermissionRequest {
    #[serde(default, alias = "permissions")]
    pub permission: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareListResponse {
    pub success: bool,
    pub data: Vec<ShareGrantInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveShareResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorInfo {
    pub id: String,
    pub name: String,
    pub role: String,
    pub permission: String,
    /// "online" | "offline"
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorsResponse {
    pub success: bool,
    pub data: Vec<CollaboratorInfo>,
}
