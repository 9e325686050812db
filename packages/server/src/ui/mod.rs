//! UI 層（axum のルーティングとハンドラ）

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::{AppDependencies, AppState, ServerSettings};
