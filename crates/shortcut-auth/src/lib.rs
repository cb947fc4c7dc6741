//! Identity codec for the Shortcut URL shortener.
//!
//! An [`Identity`](shortcut_core::Identity) is handed to clients only as an
//! opaque cookie token: the raw identity bytes sealed with AES-256-GCM
//! under a process-wide key, with a fresh random nonce prepended to the
//! ciphertext, hex-encoded.
//!
//! ```rust
//! use shortcut_auth::{AuthKey, IdentityCodec};
//! use shortcut_core::Identity;
//!
//! let codec = IdentityCodec::new(&AuthKey::generate());
//! let identity = Identity::random();
//! let token = codec.encode(identity).unwrap();
//! assert_eq!(codec.decode(&token).unwrap(), identity);
//! ```

pub mod codec;
pub mod error;
pub mod key;

pub use codec::IdentityCodec;
pub use error::{AuthError, Result};
pub use key::AuthKey;
