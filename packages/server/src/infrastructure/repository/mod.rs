//! Repository の実装
//!
//! - `inmemory`: プロセス内のインメモリ実装

pub mod inmemory;

pub use inmemory::{
    InMemoryDocumentStore, InMemoryRoomRepository, InMemoryShareGrantRepository,
    InMemoryShareLinkRepository, StoredContent,
};
