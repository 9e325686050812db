//! Utilities shared between the Yoriai server binary and its tests.

pub mod logger;
pub mod time;
