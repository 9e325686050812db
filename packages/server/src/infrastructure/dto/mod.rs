//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame DTOs
//! - `http`: HTTP API request / response DTOs
//! - `document`: document seed file records

pub mod conversion;
pub mod document;
pub mod http;
pub mod websocket;

pub use document::DocumentRecord;
