//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - credential の検証と、接続 Identity の決定
//!
//! ### なぜこのテストが必要か
//! - 無効な credential でも接続自体は拒否せず、匿名として扱うことを保証
//! - 接続数のカウントと送信キューの登録が行われることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効な credential、credential なし
//! - 異常系：無効な credential（匿名に降格）

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{
    ConnectionContext, ConnectionCounter, ConnectionGuard, ConnectionId, CredentialVerifier,
    Identity, MessagePusher, PusherChannel, Timestamp,
};

/// 接続結果
///
/// `guard` が破棄されるまで接続中としてカウントされる。
#[derive(Debug)]
pub struct ConnectedParticipant {
    pub context: ConnectionContext,
    pub guard: ConnectionGuard,
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    verifier: Arc<dyn CredentialVerifier>,
    message_pusher: Arc<dyn MessagePusher>,
    counter: Arc<ConnectionCounter>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        message_pusher: Arc<dyn MessagePusher>,
        counter: Arc<ConnectionCounter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            message_pusher,
            counter,
            clock,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `credential` - 接続時に提示された credential（任意）
    /// * `sender` - 接続の送信キュー
    ///
    /// # Returns
    ///
    /// 接続コンテキストと接続数のガード。credential が無効でも失敗せず、匿名として接続する。
    pub async fn execute(
        &self,
        credential: Option<&str>,
        sender: PusherChannel,
    ) -> ConnectedParticipant {
        let connection_id = ConnectionId::generate();

        // 1. Identity の決定
        let identity = match credential {
            Some(credential) => match self.verifier.verify(credential) {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::warn!(
                        "Connection '{}' presented a rejected credential, continuing as anonymous: {}",
                        connection_id,
                        e
                    );
                    Identity::anonymous(&connection_id)
                }
            },
            None => Identity::anonymous(&connection_id),
        };

        // 2. 送信キューの登録
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;

        // 3. 接続数のカウント
        let guard = self.counter.acquire();

        tracing::info!(
            "Connection '{}' established as '{}'{} ({} active)",
            connection_id,
            identity.username,
            if identity.is_anonymous() { " (anonymous)" } else { "" },
            self.counter.active()
        );

        ConnectedParticipant {
            context: ConnectionContext {
                connection_id,
                identity,
                connected_at: Timestamp::new(self.clock.now_millis()),
            },
            guard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{CredentialError, MockCredentialVerifier},
        infrastructure::message_pusher::WebSocketMessagePusher,
        usecase::test_support::user,
    };
    use tokio::sync::mpsc;
    use yoriai_shared::time::FixedClock;

    fn usecase(
        verifier: MockCredentialVerifier,
    ) -> (
        ConnectParticipantUseCase,
        Arc<WebSocketMessagePusher>,
        Arc<ConnectionCounter>,
    ) {
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let counter = Arc::new(ConnectionCounter::new());
        let usecase = ConnectParticipantUseCase::new(
            Arc::new(verifier),
            pusher.clone(),
            counter.clone(),
            Arc::new(FixedClock::new(1_000)),
        );
        (usecase, pusher, counter)
    }

    #[tokio::test]
    async fn test_connect_with_valid_credential() {
        // テスト項目: 有効な credential で接続すると、その Identity になる
        // given (前提条件):
        let mut verifier = MockCredentialVerifier::new();
        verifier
            .expect_verify()
            .withf(|credential| credential == "good")
            .returning(|_| Ok(user("u1")));
        let (usecase, pusher, counter) = usecase(verifier);
        let (tx, _rx) = mpsc::channel(1);

        // when (操作):
        let connected = usecase.execute(Some("good"), tx).await;

        // then (期待する結果):
        assert_eq!(connected.context.identity, user("u1"));
        assert_eq!(connected.context.connected_at, Timestamp::new(1_000));
        assert_eq!(pusher.count_clients(), 1);
        assert_eq!(counter.active(), 1);
    }

    #[tokio::test]
    async fn test_connect_with_rejected_credential_is_anonymous() {
        // テスト項目: 無効な credential でも接続は成功し、匿名になる
        // given (前提条件):
        let mut verifier = MockCredentialVerifier::new();
        verifier
            .expect_verify()
            .returning(|_| Err(CredentialError::Expired));
        let (usecase, _pusher, _counter) = usecase(verifier);
        let (tx, _rx) = mpsc::channel(1);

        // when (操作):
        let connected = usecase.execute(Some("stale"), tx).await;

        // then (期待する結果):
        let identity = &connected.context.identity;
        assert!(identity.is_anonymous());
        assert_eq!(
            identity.user_id.as_str(),
            connected.context.connection_id.as_str()
        );
    }

    #[tokio::test]
    async fn test_connect_without_credential_skips_verification() {
        // テスト項目: credential なしでは検証を行わず匿名で接続する
        // given (前提条件):
        let mut verifier = MockCredentialVerifier::new();
        verifier.expect_verify().times(0);
        let (usecase, _pusher, counter) = usecase(verifier);
        let (tx1, _rx1) = mpsc::channel(1);
        let (tx2, _rx2) = mpsc::channel(1);

        // when (操作):
        let first = usecase.execute(None, tx1).await;
        let second = usecase.execute(None, tx2).await;

        // then (期待する結果):
        assert!(first.context.identity.is_anonymous());
        assert_ne!(first.context.connection_id, second.context.connection_id);
        assert_eq!(counter.active(), 2);

        drop(first.guard);
        assert_eq!(counter.active(), 1);
    }
}
