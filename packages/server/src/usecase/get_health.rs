//! UseCase: ヘルスチェック

use std::sync::Arc;

use yoriai_shared::time::Clock;

use crate::domain::{ConnectionCounter, RoomRepository, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub timestamp: Timestamp,
    pub uptime_seconds: u64,
    pub active_connections: usize,
    pub total_connections: u64,
    pub active_rooms: usize,
}

impl HealthReport {
    /// `1d 2h 3m 4s` 形式の稼働時間（0 の上位単位は省略）
    pub fn uptime_display(&self) -> String {
        format_uptime(self.uptime_seconds)
    }
}

pub struct GetHealthUseCase {
    counter: Arc<ConnectionCounter>,
    rooms: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
    started_at: i64,
}

impl GetHealthUseCase {
    pub fn new(
        counter: Arc<ConnectionCounter>,
        rooms: Arc<dyn RoomRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let started_at = clock.now_millis();
        Self {
            counter,
            rooms,
            clock,
            started_at,
        }
    }

    pub async fn execute(&self) -> HealthReport {
        let now = self.clock.now_millis();
        HealthReport {
            timestamp: Timestamp::new(now),
            uptime_seconds: u64::try_from((now - self.started_at) / 1000).unwrap_or(0),
            active_connections: self.counter.active(),
            total_connections: self.counter.total(),
            active_rooms: self.rooms.count_rooms().await,
        }
    }
}

fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));
    parts.join(" ")
}
