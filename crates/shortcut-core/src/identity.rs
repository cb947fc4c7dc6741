use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// An anonymous user identity.
///
/// Identities are random 128-bit values. They are only ever handed to
/// clients in encrypted form, see the `shortcut-auth` crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    /// Generates a fresh random identity.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identity from its raw 16-byte form.
    ///
    /// Returns `None` when the slice is not exactly 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        Uuid::from_slice(bytes).ok().map(Self)
    }

    /// Returns the raw 16-byte form.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for Identity {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_identities_differ() {
        assert_ne!(Identity::random(), Identity::random());
    }

    #[test]
    fn from_slice_round_trips_raw_bytes() {
        let identity = Identity::random();
        let parsed = Identity::from_slice(identity.as_bytes()).unwrap();
        assert_eq!(parsed, identity);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(Identity::from_slice(&[0u8; 15]).is_none());
        assert!(Identity::from_slice(&[0u8; 17]).is_none());
        assert!(Identity::from_slice(&[]).is_none());
    }
}
