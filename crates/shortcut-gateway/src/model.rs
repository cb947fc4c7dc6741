use serde::{Deserialize, Serialize};

pub use shortcut_shortener::{BatchRequestItem, BatchResponseItem, UserUrl};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub result: String,
}
