use thiserror::Error;

/// Result type for identity codec operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors raised while sealing or opening identity tokens.
///
/// Messages never include key material or token contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("token is not valid hex")]
    InvalidEncoding,
    #[error("token is shorter than the nonce")]
    Truncated,
    #[error("token failed authentication")]
    Authentication,
    #[error("token does not contain a valid identity")]
    InvalidIdentity,
    #[error("auth key is invalid: {0}")]
    InvalidKey(String),
    #[error("identity encryption failed")]
    Encryption,
}
