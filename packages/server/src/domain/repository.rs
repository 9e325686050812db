//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use serde_json::Value;

use super::{
    ConnectionId, Document, DocumentId, Participant, Permission, RepositoryError, RoomSnapshot,
    ShareGrant, ShareLink, ShareToken, Timestamp, UserId,
};

/// 参加結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    /// 参加後の参加者一覧（参加者本人を含む）
    pub snapshot: RoomSnapshot,
    /// 同じ接続で既に参加していた場合の置き換え前の参加者
    pub replaced: Option<Participant>,
}

/// Room Repository trait
///
/// ドキュメントごとのルームと、接続ごとの参加ルームの索引を管理する。
/// 参加者がいなくなったルームは削除される。
///
/// 同じルームに対する操作は直列化され、異なるルームに対する操作は互いをブロックしない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームに参加する（ルームがなければ作成する）
    async fn join(&self, document_id: DocumentId, participant: Participant) -> JoinedRoom;

    /// ルームから退出する
    ///
    /// 参加していなかった場合は `None`。ルームが空になれば削除する。
    async fn leave(
        &self,
        document_id: &DocumentId,
        connection_id: &ConnectionId,
    ) -> Option<Participant>;

    /// 接続が参加している全てのルームから退出する
    ///
    /// 退出したルームと、そのルームでの参加者情報を返す。
    async fn leave_all(&self, connection_id: &ConnectionId) -> Vec<(DocumentId, Participant)>;

    /// ルームの参加者一覧を取得（ルームがなければ空）
    async fn list_participants(&self, document_id: &DocumentId) -> Vec<Participant>;

    /// ルーム内の特定の参加者を取得
    async fn find_participant(
        &self,
        document_id: &DocumentId,
        connection_id: &ConnectionId,
    ) -> Option<Participant>;

    /// 参加者のいるルーム数
    async fn count_rooms(&self) -> usize;
}

/// Document Store trait
///
/// ドキュメントのメタデータ取得と、編集内容の永続化を担う外部ストア。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, document_id: &DocumentId)
    -> Result<Option<Document>, RepositoryError>;

    /// 編集内容を記録する
    async fn record_change(
        &self,
        document_id: &DocumentId,
        changes: &Value,
        user_id: &UserId,
    ) -> Result<(), RepositoryError>;
}

/// Share Grant Repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareGrantRepository: Send + Sync {
    async fn find(
        &self,
        document_id: &DocumentId,
        subject: &UserId,
    ) -> Result<Option<ShareGrant>, RepositoryError>;

    /// (document, subject) の組で upsert する
    ///
    /// 既存の権限より高い場合のみ引き上げ、結果の Grant を返す。アトミックに実行される。
    async fn upsert_max(&self, grant: ShareGrant) -> Result<ShareGrant, RepositoryError>;

    /// 既存の Grant の権限を指定した値に置き換える（引き下げも行う）
    ///
    /// Grant が存在しない場合は `None`。
    async fn set_permission(
        &self,
        document_id: &DocumentId,
        subject: &UserId,
        permission: Permission,
    ) -> Result<Option<ShareGrant>, RepositoryError>;

    /// Grant を削除し、削除した Grant を返す
    async fn remove(
        &self,
        document_id: &DocumentId,
        subject: &UserId,
    ) -> Result<Option<ShareGrant>, RepositoryError>;

    async fn list_for_document(
        &self,
        document_id: &DocumentId,
    ) -> Result<Vec<ShareGrant>, RepositoryError>;
}

/// Share Link Repository trait
///
/// 失効済みのリンクは存在しないものとして扱う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareLinkRepository: Send + Sync {
    /// 同じトークンが既に存在する場合は `RepositoryError::Conflict`
    async fn insert(&self, link: ShareLink) -> Result<(), RepositoryError>;

    /// 有効なリンクを取得する（副作用なし）
    async fn find_active(
        &self,
        token: &ShareToken,
        now: Timestamp,
    ) -> Result<Option<ShareLink>, RepositoryError>;

    /// 閲覧を記録し、更新後のリンクを返す
    async fn record_view(
        &self,
        token: &ShareToken,
        viewer: Option<UserId>,
        now: Timestamp,
    ) -> Result<Option<ShareLink>, RepositoryError>;

    /// 利用を記録し、更新後のリンクを返す
    async fn record_redemption(
        &self,
        token: &ShareToken,
        user_id: UserId,
        now: Timestamp,
    ) -> Result<Option<ShareLink>, RepositoryError>;

    /// 失効済みのリンクを削除し、削除した件数を返す
    async fn purge_expired(&self, now: Timestamp) -> Result<usize, RepositoryError>;
}
