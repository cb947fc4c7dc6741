use aes_gcm::aead::{KeyInit, OsRng};
use aes_gcm::Aes256Gcm;

use crate::error::{AuthError, Result};

/// Key size for AES-256 (32 bytes / 256 bits).
pub const KEY_SIZE: usize = 32;

/// The process-wide secret used to seal identity tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey([u8; KEY_SIZE]);

impl AuthKey {
    /// Creates a key from exactly 32 raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            AuthError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Creates a key from its 64-character hex form.
    pub fn from_hex(value: &str) -> Result<Self> {
        let bytes = hex::decode(value.trim())
            .map_err(|_| AuthError::InvalidKey("key is not valid hex".to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Generates a random key from the operating system RNG.
    pub fn generate() -> Self {
        let generated = Aes256Gcm::generate_key(&mut OsRng);
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(generated.as_slice());
        Self(key)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthKey").field(&"<redacted>").finish()
    }
}

impl std::str::FromStr for AuthKey {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_requires_32_bytes() {
        assert!(AuthKey::from_bytes(&[7u8; 32]).is_ok());
        assert!(matches!(
            AuthKey::from_bytes(&[7u8; 16]),
            Err(AuthError::InvalidKey(_))
        ));
    }

    #[test]
    fn from_hex_parses_64_chars() {
        let key: AuthKey = "00".repeat(32).parse().unwrap();
        assert_eq!(key.as_bytes(), &[0u8; 32]);
        assert!(AuthKey::from_hex("zz").is_err());
        assert!(AuthKey::from_hex("00").is_err());
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(AuthKey::generate(), AuthKey::generate());
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = AuthKey::from_bytes(&[0xab; 32]).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("171"));
        assert!(debug.contains("redacted"));
    }
}
