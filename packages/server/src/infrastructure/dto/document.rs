//! Document seed file DTOs.

use serde::{Deserialize, Serialize};

/// 初期データファイルの 1 レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub is_shared: bool,
}
