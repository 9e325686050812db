//! Real-time document collaboration session server.
//!
//! Rooms of live connections per document, permission resolution from
//! ownership and share grants, share links with lazy expiry, and fan-out of
//! editing events over WebSocket.

pub mod config;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
