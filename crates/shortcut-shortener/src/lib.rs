//! Request orchestration for the Shortcut URL shortener.
//!
//! [`ShortenerService`] sits between the HTTP adapter and an
//! [`AuthStore`](shortcut_core::AuthStore): it picks the owned or anonymous
//! storage call for the caller's identity and turns issued identifiers into
//! full short URLs.

pub mod error;
pub mod model;
pub mod service;

pub use error::{Result, ShortenerError};
pub use model::{BatchRequestItem, BatchResponseItem, UserUrl};
pub use service::ShortenerService;
