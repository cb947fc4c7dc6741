use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;

use crate::error::StoreError;

/// An opaque identifier for a shortened URL.
///
/// Identifiers are issued by the store: the in-memory and file stores use
/// the record count in lowercase hex, the relational store uses the row id
/// in decimal. Ordering is by length first, so issued identifiers sort in
/// allocation order for both schemes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(String);

const MAX_LENGTH: usize = 32;

impl ShortId {
    /// Creates a `ShortId` after validating the input.
    ///
    /// Valid identifiers are 1-32 ASCII alphanumeric characters.
    pub fn new(id: impl Into<String>) -> std::result::Result<Self, StoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Creates a `ShortId` without validation.
    ///
    /// Use this only for identifiers produced by a store.
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Formats the n-th allocated record as an identifier.
    pub fn from_sequence(n: usize) -> Self {
        Self(format!("{n:x}"))
    }

    /// Formats a relational row id as an identifier.
    pub fn from_row_id(id: i64) -> Self {
        Self(id.to_string())
    }

    /// Parses the identifier back into a relational row id.
    ///
    /// Returns `None` for identifiers that no row could have produced.
    pub fn to_row_id(&self) -> Option<i64> {
        self.0.parse().ok().filter(|id: &i64| *id > 0)
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> std::result::Result<(), StoreError> {
        if id.is_empty() || id.len() > MAX_LENGTH {
            return Err(StoreError::InvalidData(format!(
                "short id length must be between 1 and {}, got {}",
                MAX_LENGTH,
                id.len()
            )));
        }

        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StoreError::InvalidData(format!(
                "short id must be alphanumeric: '{}'",
                id
            )));
        }

        Ok(())
    }
}

impl Ord for ShortId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ShortId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ShortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
