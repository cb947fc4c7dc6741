//! HTTP adapter for the Shortcut URL shortener.
//!
//! Exposes [`ShortenerService`](shortcut_shortener::ShortenerService) over
//! axum, resolving the caller's identity from a sealed `auth` cookie.

pub mod app;
pub mod auth;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
