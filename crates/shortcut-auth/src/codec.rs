use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use shortcut_core::Identity;

use crate::error::{AuthError, Result};
use crate::key::AuthKey;

/// Nonce size for AES-256-GCM (12 bytes / 96 bits).
const NONCE_SIZE: usize = 12;

/// Seals identities into cookie-safe tokens and opens them again.
///
/// Token layout before hex encoding: `nonce || ciphertext || tag`.
#[derive(Clone)]
pub struct IdentityCodec {
    cipher: Aes256Gcm,
}

impl IdentityCodec {
    pub fn new(key: &AuthKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypts an identity under a fresh random nonce.
    pub fn encode(&self, identity: Identity) -> Result<String> {
        let sealed = self.seal(identity.as_bytes())?;
        Ok(hex::encode(sealed))
    }

    /// Authenticates and decrypts a token produced by [`encode`](Self::encode).
    pub fn decode(&self, token: &str) -> Result<Identity> {
        let sealed = hex::decode(token).map_err(|_| AuthError::InvalidEncoding)?;
        if sealed.len() < NONCE_SIZE {
            return Err(AuthError::Truncated);
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        let raw = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AuthError::Authentication)?;

        Identity::from_slice(&raw).ok_or(AuthError::InvalidIdentity)
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| AuthError::Encryption)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(nonce.as_slice());
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }
}

impl std::fmt::Debug for IdentityCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> IdentityCodec {
        IdentityCodec::new(&AuthKey::from_bytes(b"ololo-trololo-shimba-boomba-look").unwrap())
    }

    fn flip_byte(token: &str, index: usize) -> String {
        let mut bytes = hex::decode(token).unwrap();
        bytes[index] ^= 0x01;
        hex::encode(bytes)
    }

    #[test]
    fn round_trip() {
        let codec = codec();
        for _ in 0..16 {
            let identity = Identity::random();
            let token = codec.encode(identity).unwrap();
            assert_eq!(codec.decode(&token).unwrap(), identity);
        }
    }

    #[test]
    fn tokens_use_fresh_nonces() {
        let codec = codec();
        let identity = Identity::random();
        assert_ne!(codec.encode(identity).unwrap(), codec.encode(identity).unwrap());
    }

    #[test]
    fn token_is_lowercase_hex() {
        let token = codec().encode(Identity::random()).unwrap();
        // nonce + 16 identity bytes + 16 tag bytes
        assert_eq!(token.len(), 2 * (NONCE_SIZE + 16 + 16));
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn flipped_byte_fails_authentication() {
        let codec = codec();
        let token = codec.encode(Identity::random()).unwrap();
        let len = hex::decode(&token).unwrap().len();

        for index in [0, NONCE_SIZE, NONCE_SIZE + 5, len - 1] {
            let tampered = flip_byte(&token, index);
            assert_eq!(codec.decode(&tampered), Err(AuthError::Authentication));
        }
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let token = codec().encode(Identity::random()).unwrap();
        let other = IdentityCodec::new(&AuthKey::generate());
        assert_eq!(other.decode(&token), Err(AuthError::Authentication));
    }

    #[test]
    fn truncated_token_is_rejected() {
        let codec = codec();
        assert_eq!(codec.decode(""), Err(AuthError::Truncated));
        assert_eq!(codec.decode(&"ab".repeat(NONCE_SIZE - 1)), Err(AuthError::Truncated));
        // a bare nonce passes the length check but cannot authenticate
        assert_eq!(
            codec.decode(&"ab".repeat(NONCE_SIZE)),
            Err(AuthError::Authentication)
        );
    }

    #[test]
    fn non_hex_token_is_rejected() {
        assert_eq!(codec().decode("not-hex"), Err(AuthError::InvalidEncoding));
    }

    #[test]
    fn non_identity_payload_is_rejected() {
        let codec = codec();
        let token = hex::encode(codec.seal(b"too short").unwrap());
        assert_eq!(codec.decode(&token), Err(AuthError::InvalidIdentity));
    }
}
