//! Core types and traits for the Shortcut URL shortener.
//!
//! This crate provides the storage contract shared by every backend and
//! by the orchestration layer: short identifiers, record entries, owner
//! identities and the nested [`Store`] / [`BatchStore`] / [`AuthStore`]
//! capability traits.

pub mod error;
pub mod identity;
pub mod short_id;
pub mod store;

pub use error::{Result, StoreError};
pub use identity::Identity;
pub use short_id::ShortId;
pub use store::{AuthStore, BatchStore, Entry, Store, UrlRecord};
pub use url::Url;
