//! Infrastructure 層
//!
//! ドメイン層が定義する trait の具体的な実装と、ワイヤ形式の DTO を提供します。

pub mod auth;
pub mod dto;
pub mod message_pusher;
pub mod repository;
