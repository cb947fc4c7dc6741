mod health;
mod url;
mod user;

pub use health::ping_handler;
pub use url::{expand_handler, shorten_api_handler, shorten_batch_handler, shorten_handler};
pub use user::{delete_user_urls_handler, user_urls_handler};

use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;

/// Decodes a JSON body regardless of its `Content-Type`.
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("bad request body: {e}")))
}
