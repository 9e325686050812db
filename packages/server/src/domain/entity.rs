//! Entities

use std::collections::BTreeSet;

use super::{ConnectionId, DocumentId, Permission, ShareToken, Timestamp, UserId};

/// Username reported for connections without a verified credential.
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// 接続の主体（ユーザー）
///
/// 検証済み credential から得た Identity は永続的（durable）で、
/// 匿名 Identity は接続 ID をユーザー ID として流用する一時的なものである。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    anonymous: bool,
}

impl Identity {
    pub fn authenticated(user_id: UserId, username: String) -> Self {
        Self {
            user_id,
            username,
            anonymous: false,
        }
    }

    pub fn anonymous(connection_id: &ConnectionId) -> Self {
        Self {
            user_id: UserId::from(connection_id),
            username: ANONYMOUS_USERNAME.to_string(),
            anonymous: true,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// 変更の永続化や共有の付与に使える Identity か
    pub fn is_durable(&self) -> bool {
        !self.anonymous
    }
}

/// 接続ごとのコンテキスト
///
/// 接続時に一度だけ作られ、以降は変更されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionContext {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    pub connected_at: Timestamp,
}

/// ルーム参加者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    pub joined_at: Timestamp,
    /// 参加時に解決した実効権限
    pub permission: Option<Permission>,
}

impl Participant {
    pub fn new(
        connection_id: ConnectionId,
        identity: Identity,
        joined_at: Timestamp,
        permission: Option<Permission>,
    ) -> Self {
        Self {
            connection_id,
            identity,
            joined_at,
            permission,
        }
    }
}

/// ドキュメント単位の協調編集ルーム
///
/// 参加者は接続 ID で一意。参加順を保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub document_id: DocumentId,
    participants: Vec<Participant>,
}

impl Room {
    pub fn new(document_id: DocumentId) -> Self {
        Self {
            document_id,
            participants: Vec::new(),
        }
    }

    /// 参加者を追加する
    ///
    /// 同じ接続 ID の参加者が既にいる場合は置き換え、置き換え前の参加者を返す。
    pub fn join(&mut self, participant: Participant) -> Option<Participant> {
        match self
            .participants
            .iter_mut()
            .find(|p| p.connection_id == participant.connection_id)
        {
            Some(existing) => Some(std::mem::replace(existing, participant)),
            None => {
                self.participants.push(participant);
                None
            }
        }
    }

    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| &p.connection_id == connection_id)?;
        Some(self.participants.remove(index))
    }

    pub fn find(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| &p.connection_id == connection_id)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// ある時点でのルームの参加者一覧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub document_id: DocumentId,
    pub participants: Vec<Participant>,
}

impl RoomSnapshot {
    /// 指定した接続以外の参加者の接続 ID
    pub fn connection_ids_except(&self, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        self.participants
            .iter()
            .filter(|p| &p.connection_id != connection_id)
            .map(|p| p.connection_id.clone())
            .collect()
    }
}

/// ドキュメント
///
/// `collaborator_ids` と `is_shared` は表示用の情報で、権限判定には使わない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub owner_id: UserId,
    pub collaborator_ids: Vec<UserId>,
    pub is_shared: bool,
}

/// ユーザーに付与された共有権限
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareGrant {
    pub document_id: DocumentId,
    pub subject: UserId,
    pub granted_by: UserId,
    pub permission: Permission,
    pub created_at: Timestamp,
}

impl ShareGrant {
    pub fn new(
        document_id: DocumentId,
        subject: UserId,
        granted_by: UserId,
        permission: Permission,
        created_at: Timestamp,
    ) -> Self {
        Self {
            document_id,
            subject,
            granted_by,
            permission,
            created_at,
        }
    }

    /// 権限を引き上げる（引き下げは行わない）
    ///
    /// 権限が変わった場合に `true` を返す。
    pub fn upgrade(&mut self, permission: Permission) -> bool {
        if permission > self.permission {
            self.permission = permission;
            true
        } else {
            false
        }
    }
}

/// 共有リンク
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub token: ShareToken,
    pub document_id: DocumentId,
    pub created_by: UserId,
    pub permission: Permission,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub access_count: u64,
    pub accessed_by: BTreeSet<UserId>,
}

impl ShareLink {
    pub fn new(
        token: ShareToken,
        document_id: DocumentId,
        created_by: UserId,
        permission: Permission,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            token,
            document_id,
            created_by,
            permission,
            created_at,
            expires_at,
            access_count: 0,
            accessed_by: BTreeSet::new(),
        }
    }

    /// `expires_at` ちょうどの時刻で失効済みとみなす
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    /// リンク経由の閲覧を記録する（閲覧のたびに回数を加算）
    pub fn record_view(&mut self, viewer: Option<&UserId>) {
        self.access_count += 1;
        if let Some(user_id) = viewer {
            self.accessed_by.insert(user_id.clone());
        }
    }

    /// リンクの利用（参加）を記録する
    ///
    /// 初めて利用するユーザーの場合のみ回数を加算し、`true` を返す。
    pub fn record_redemption(&mut self, user_id: &UserId) -> bool {
        if self.accessed_by.insert(user_id.clone()) {
            self.access_count += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(connection: &str, user: &str, joined_at: i64) -> Participant {
        Participant::new(
            ConnectionId::new(connection.to_string()).unwrap(),
            Identity::authenticated(UserId::new(user.to_string()).unwrap(), user.to_string()),
            Timestamp::new(joined_at),
            Some(Permission::Write),
        )
    }

    fn link(expires_at: i64) -> ShareLink {
        ShareLink::new(
            ShareToken::new("token".to_string()).unwrap(),
            DocumentId::new("doc-1".to_string()).unwrap(),
            UserId::new("owner".to_string()).unwrap(),
            Permission::Write,
            Timestamp::new(0),
            Timestamp::new(expires_at),
        )
    }

    #[test]
    fn test_anonymous_identity_uses_connection_id() {
        // テスト項目: 匿名 Identity は接続 ID をユーザー ID とし、永続的ではない
        // given (前提条件):
        let connection_id = ConnectionId::new("conn-1".to_string()).unwrap();

        // when (操作):
        let identity = Identity::anonymous(&connection_id);

        // then (期待する結果):
        assert_eq!(identity.user_id.as_str(), "conn-1");
        assert_eq!(identity.username, ANONYMOUS_USERNAME);
        assert!(identity.is_anonymous());
        assert!(!identity.is_durable());
    }

    #[test]
    fn test_room_join_is_idempotent_per_connection() {
        // テスト項目: 同じ接続 ID で再参加しても参加者は重複しない
        // given (前提条件):
        let mut room = Room::new(DocumentId::new("doc-1".to_string()).unwrap());
        room.join(participant("c1", "alice", 1));
        room.join(participant("c2", "bob", 2));

        // when (操作):
        let replaced = room.join(participant("c1", "alice", 3));

        // then (期待する結果):
        assert_eq!(replaced.map(|p| p.joined_at), Some(Timestamp::new(1)));
        assert_eq!(room.participants().len(), 2);
        assert_eq!(room.participants()[0].connection_id.as_str(), "c1");
        assert_eq!(room.participants()[0].joined_at, Timestamp::new(3));
    }

    #[test]
    fn test_room_leave_removes_only_target() {
        // テスト項目: 退出は指定した接続のみを取り除き、未参加なら None を返す
        // given (前提条件):
        let mut room = Room::new(DocumentId::new("doc-1".to_string()).unwrap());
        room.join(participant("c1", "alice", 1));
        room.join(participant("c2", "bob", 2));
        let c1 = ConnectionId::new("c1".to_string()).unwrap();

        // when (操作):
        let first = room.leave(&c1);
        let second = room.leave(&c1);

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(room.participants().len(), 1);
        assert!(!room.is_empty());
    }

    #[test]
    fn test_share_grant_upgrade_never_downgrades() {
        // テスト項目: 共有権限は引き上げのみ行われる
        // given (前提条件):
        let mut grant = ShareGrant::new(
            DocumentId::new("doc-1".to_string()).unwrap(),
            UserId::new("bob".to_string()).unwrap(),
            UserId::new("alice".to_string()).unwrap(),
            Permission::Write,
            Timestamp::new(0),
        );

        // when (操作):
        let downgraded = grant.upgrade(Permission::Read);
        let upgraded = grant.upgrade(Permission::Admin);

        // then (期待する結果):
        assert!(!downgraded);
        assert!(upgraded);
        assert_eq!(grant.permission, Permission::Admin);
    }

    #[test]
    fn test_share_link_expiry_boundary() {
        // テスト項目: expires_at ちょうどで失効、1ms 前は有効
        // given (前提条件):
        let link = link(1_000);

        // when (操作) / then (期待する結果):
        assert!(!link.is_expired(Timestamp::new(999)));
        assert!(link.is_expired(Timestamp::new(1_000)));
        assert!(link.is_expired(Timestamp::new(1_001)));
    }

    #[test]
    fn test_share_link_redemption_counts_each_user_once() {
        // テスト項目: 同じユーザーの再利用では利用回数が増えない
        // given (前提条件):
        let mut link = link(1_000);
        let bob = UserId::new("bob".to_string()).unwrap();

        // when (操作):
        let first = link.record_redemption(&bob);
        let second = link.record_redemption(&bob);

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(link.access_count, 1);
        assert_eq!(link.accessed_by.len(), 1);
    }

    #[test]
    fn test_share_link_view_counts_every_access() {
        // テスト項目: 閲覧は毎回カウントされ、匿名閲覧者は記録されない
        // given (前提条件):
        let mut link = link(1_000);
        let bob = UserId::new("bob".to_string()).unwrap();

        // when (操作):
        link.record_view(None);
        link.record_view(Some(&bob));
        link.record_view(Some(&bob));

        // then (期待する結果):
        assert_eq!(link.access_count, 3);
        assert_eq!(link.accessed_by.len(), 1);
    }
}
