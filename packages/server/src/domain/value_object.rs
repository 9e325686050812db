//! Value Objects
//!
//! 生成時に検証を行い、以降は不変な値として扱う。

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};

use super::DomainError;

const MAX_ID_LENGTH: usize = 128;

fn validate_id(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Empty(field));
    }
    if value.chars().count() > MAX_ID_LENGTH {
        return Err(DomainError::TooLong {
            field,
            max: MAX_ID_LENGTH,
        });
    }
    Ok(())
}

/// ドキュメント ID（= ルーム ID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        validate_id("document id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ユーザー ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        validate_id("user id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// 匿名接続では接続 ID をそのままユーザー ID として扱う
impl From<&ConnectionId> for UserId {
    fn from(connection_id: &ConnectionId) -> Self {
        Self(connection_id.as_str().to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// トランスポート層の接続 ID
///
/// 接続ごとにサーバー側で採番する。匿名接続の Identity にも使われる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(value: String) -> Result<Self, DomainError> {
        validate_id("connection id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix タイムスタンプ（UTC, ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn add_millis(self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

/// 権限レベル
///
/// `Read < Write < Admin` の全順序を持つ。「権限なし」は `Option<Permission>` の `None` で表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Admin,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Admin => "admin",
        }
    }

    /// 実効権限 `effective` で `required` のアクションが許可されるか
    pub fn allows(effective: Option<Permission>, required: Permission) -> bool {
        effective.is_some_and(|p| p >= required)
    }
}

impl FromStr for Permission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "admin" => Ok(Permission::Admin),
            other => Err(DomainError::InvalidPermission(other.to_string())),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 共有リンクのトークン
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShareToken(String);

impl ShareToken {
    /// Bytes of entropy per generated token.
    pub const ENTROPY_BYTES: usize = 16;

    /// OS の CSPRNG から 16 バイトを読み、hex エンコードしたトークンを生成する
    pub fn generate() -> Self {
        let mut bytes = [0u8; Self::ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::Empty("share token"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 共有リンクの有効期間（ミリ秒、常に正）
///
/// `30m`, `12h`, `7d` のような `<数値><単位>` 形式、または単位なしのミリ秒を受け付ける。
/// 上限は [`LinkTtl::MAX_MILLIS`]（約 10 年）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinkTtl(i64);

impl LinkTtl {
    /// 3650 days
    pub const MAX_MILLIS: i64 = 3650 * 24 * 60 * 60 * 1000;

    pub fn from_millis(millis: i64) -> Result<Self, DomainError> {
        if millis <= 0 || millis > Self::MAX_MILLIS {
            return Err(DomainError::InvalidTtl(millis.to_string()));
        }
        Ok(Self(millis))
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl Default for LinkTtl {
    fn default() -> Self {
        Self(7 * 24 * 60 * 60 * 1000)
    }
}

impl FromStr for LinkTtl {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = || DomainError::InvalidTtl(s.to_string());

        let split_at = input
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(input.len());
        let (digits, unit) = input.split_at(split_at);
        let amount: i64 = digits.parse().map_err(|_| invalid())?;

        let unit_millis: i64 = match unit.trim() {
            "" | "ms" => 1,
            "s" => 1_000,
            "m" => 60 * 1_000,
            "h" => 60 * 60 * 1_000,
            "d" => 24 * 60 * 60 * 1_000,
            "w" => 7 * 24 * 60 * 60 * 1_000,
            _ => return Err(invalid()),
        };

        let millis = amount.checked_mul(unit_millis).ok_or_else(invalid)?;
        Self::from_millis(millis).map_err(|_| invalid())
    }
}
