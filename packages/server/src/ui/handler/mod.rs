//! HTTP / WebSocket handlers.

mod auth;
mod error;
mod http;
mod share;
mod websocket;

pub use http::{health_check, health_details};
pub use share::{
    create_share_link, get_shared_document, list_collaborators, list_shares, redeem_share_link,
    remove_share, share_document, update_share_permission,
};
pub use websocket::websocket_handler;
