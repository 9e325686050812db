//! MessagePusher trait 定義
//!
//! 接続へのイベント送信を抽象化する。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomEvent};

/// 接続ごとの送信キュー
///
/// 容量付きのチャネルで、満杯の場合はそのメッセージのみを破棄する。
pub type PusherChannel = mpsc::Sender<String>;

/// MessagePusher trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にイベントを送信する
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にイベントを送信する
    ///
    /// 一部の送信に失敗しても残りへの送信は続ける。送信できた接続数を返す。
    async fn broadcast(&self, targets: &[ConnectionId], event: &RoomEvent) -> usize;
}
