use crate::error::{Result, StoreError};
use crate::identity::Identity;
use crate::short_id::ShortId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// The state of a stored short URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    /// The record resolves to its target.
    Live(Url),
    /// The record has been tombstoned; its target is erased.
    Deleted,
}

impl Entry {
    /// Resolves the entry into its target, reporting tombstones as
    /// [`StoreError::Deleted`].
    pub fn resolve(&self, id: &ShortId) -> Result<Url> {
        match self {
            Entry::Live(url) => Ok(url.clone()),
            Entry::Deleted => Err(StoreError::Deleted(id.to_string())),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Entry::Live(_))
    }
}

/// A stored URL record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The target, or its tombstone.
    pub entry: Entry,
    /// The identity that created the record, if any.
    pub owner: Option<Identity>,
}

impl UrlRecord {
    pub fn anonymous(target: Url) -> Self {
        Self {
            entry: Entry::Live(target),
            owner: None,
        }
    }

    pub fn owned(owner: Identity, target: Url) -> Self {
        Self {
            entry: Entry::Live(target),
            owner: Some(owner),
        }
    }

    pub fn is_owned_by(&self, identity: Identity) -> bool {
        self.owner == Some(identity)
    }
}

/// The minimal storage capability: save and resolve single URLs.
///
/// Implementations must be safe to share between request handlers.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Saves a target and returns its newly allocated identifier.
    async fn save(&self, target: &Url) -> Result<ShortId>;

    /// Resolves an identifier.
    ///
    /// Returns [`StoreError::NotFound`] if the identifier was never issued
    /// and [`StoreError::Deleted`] if it has been tombstoned.
    async fn load(&self, id: &ShortId) -> Result<Url>;

    /// Checks that the underlying medium is reachable.
    async fn ping(&self) -> Result<()>;

    /// Releases underlying resources. Calling it twice is not an error.
    async fn close(&self) -> Result<()>;
}

/// A store that can save several targets in one call.
#[async_trait]
pub trait BatchStore: Store {
    /// Saves every target and returns their identifiers in input order.
    ///
    /// Returns [`StoreError::PartialBatch`] rather than a shorter list when
    /// not every target could be saved.
    async fn save_batch(&self, targets: &[Url]) -> Result<Vec<ShortId>>;
}

/// A store that scopes records to the identity that created them.
#[async_trait]
pub trait AuthStore: BatchStore {
    /// Like [`Store::save`], and adds the record to `owner`'s index.
    async fn save_user(&self, owner: Identity, target: &Url) -> Result<ShortId>;

    /// Like [`BatchStore::save_batch`], and adds the records to `owner`'s index.
    async fn save_user_batch(&self, owner: Identity, targets: &[Url]) -> Result<Vec<ShortId>>;

    /// Resolves an identifier owned by `owner`.
    ///
    /// Identifiers that exist but belong to someone else are reported as
    /// [`StoreError::NotFound`].
    async fn load_user(&self, owner: Identity, id: &ShortId) -> Result<Url>;

    /// Returns every live record owned by `owner`.
    ///
    /// Returns [`StoreError::NotFound`] if `owner` never saved anything.
    async fn load_users(&self, owner: Identity) -> Result<BTreeMap<ShortId, Url>>;

    /// Tombstones the given identifiers. Identifiers not owned by `owner`,
    /// unknown or already deleted are skipped.
    async fn delete_users(&self, owner: Identity, ids: &[ShortId]) -> Result<()>;
}
