//! UseCase: 失効済み共有リンクの定期削除
//!
//! 失効の判定は参照時に行われるため、この処理は記憶領域の回収のみを目的とする。

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use yoriai_shared::time::Clock;

use crate::domain::{RepositoryError, ShareLinkRepository, Timestamp};

pub struct PurgeExpiredLinksUseCase {
    links: Arc<dyn ShareLinkRepository>,
    clock: Arc<dyn Clock>,
}

impl PurgeExpiredLinksUseCase {
    pub fn new(links: Arc<dyn ShareLinkRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { links, clock }
    }

    pub async fn execute(&self) -> Result<usize, RepositoryError> {
        let purged = self
            .links
            .purge_expired(Timestamp::new(self.clock.now_millis()))
            .await?;
        if purged > 0 {
            tracing::info!("Purged {} expired share links", purged);
        }
        Ok(purged)
    }

    /// 一定間隔で削除を実行するタスクを起動する
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 初回の tick は即座に完了する
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.execute().await {
                    tracing::warn!("Failed to purge expired share links: {}", e);
                }
            }
        })
    }
}
