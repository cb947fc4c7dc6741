use serde::{Deserialize, Serialize};

/// One element of a batch shorten request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequestItem {
    /// Caller-chosen token echoed back in the matching response item.
    pub correlation_id: String,
    pub original_url: String,
}

/// One element of a batch shorten response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponseItem {
    pub correlation_id: String,
    pub short_url: String,
}

/// A live short URL owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}
