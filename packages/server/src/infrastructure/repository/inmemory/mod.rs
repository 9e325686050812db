//! インメモリ実装

pub mod document;
pub mod room;
pub mod share_grant;
pub mod share_link;

pub use document::{InMemoryDocumentStore, StoredContent};
pub use room::InMemoryRoomRepository;
pub use share_grant::InMemoryShareGrantRepository;
pub use share_link::InMemoryShareLinkRepository;
