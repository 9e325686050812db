//! Command line and environment configuration.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    domain::{DomainError, LinkTtl},
    ui::ServerSettings,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "yoriai-server")]
#[command(about = "Real-time document collaboration server", long_about = None)]
pub struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// HS256 secret for bearer credentials (unset: every connection is anonymous)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Base URL of the frontend used to build share URLs
    #[arg(long, env = "FRONTEND_URL", default_value = "https://document-app.com")]
    pub frontend_url: String,

    /// Lifetime of share links created without an explicit `expiresIn`
    #[arg(long, env = "DEFAULT_LINK_TTL", default_value = "7d")]
    pub default_link_ttl: String,

    /// Outbound queue capacity per connection
    #[arg(long, env = "OUTBOUND_QUEUE_CAPACITY", default_value = "256")]
    pub outbound_queue_capacity: usize,

    /// Interval of the expired share link sweep
    #[arg(long, env = "REAPER_INTERVAL_SECS", default_value = "60")]
    pub reaper_interval_secs: u64,

    /// JSON file with documents to seed the in-memory store
    #[arg(long, env = "DOCUMENTS")]
    pub documents: Option<PathBuf>,
}

impl Args {
    /// `.env` を読み込んでからコマンドライン引数をパースする
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            eprintln!("Failed to load .env: {e}");
        }
        Self::parse()
    }

    pub fn settings(&self) -> Result<ServerSettings, DomainError> {
        Ok(ServerSettings {
            frontend_url: self.frontend_url.clone(),
            default_link_ttl: self.default_link_ttl.parse::<LinkTtl>()?,
            outbound_queue_capacity: self.outbound_queue_capacity.max(1),
        })
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs.max(1))
    }
}
