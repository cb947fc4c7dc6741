//! Storage backends for the Shortcut URL shortener.
//!
//! Three implementations of the [`AuthStore`](shortcut_core::AuthStore)
//! contract with identical semantics and different durability:
//!
//! - [`InMemoryStore`]: nothing survives the process.
//! - [`FileStore`]: whole-state snapshots appended to a local file.
//! - [`PostgresStore`]: one row per record, ids from `BIGSERIAL`.

pub mod file;
pub mod memory;
pub mod postgres;
mod state;

pub use file::FileStore;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use shortcut_core::{AuthStore, BatchStore, Store, StoreError};
