use serde::{Deserialize, Serialize};
use shortcut_core::{Entry, Identity, Result, ShortId, StoreError, Url, UrlRecord};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The record table and ownership index shared by the in-memory and file
/// stores.
///
/// `records` is the single source of truth for every entry; `owners` only
/// lists which identifiers each identity created, so a tombstone is visible
/// through both paths.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct State {
    records: HashMap<ShortId, UrlRecord>,
    owners: HashMap<Identity, BTreeSet<ShortId>>,
}

impl State {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts a record under the next sequential identifier.
    ///
    /// Records are never removed, so the count only grows and identifiers
    /// are never reused while the state is alive.
    pub(crate) fn insert(&mut self, record: UrlRecord) -> ShortId {
        let id = ShortId::from_sequence(self.records.len());
        if let Some(owner) = record.owner {
            self.owners.entry(owner).or_default().insert(id.clone());
        }
        self.records.insert(id.clone(), record);
        id
    }

    pub(crate) fn insert_all(&mut self, owner: Option<Identity>, targets: &[Url]) -> Vec<ShortId> {
        targets
            .iter()
            .map(|target| {
                self.insert(UrlRecord {
                    entry: Entry::Live(target.clone()),
                    owner,
                })
            })
            .collect()
    }

    pub(crate) fn load(&self, id: &ShortId) -> Result<Url> {
        match self.records.get(id) {
            Some(record) => record.entry.resolve(id),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    pub(crate) fn load_user(&self, owner: Identity, id: &ShortId) -> Result<Url> {
        match self.records.get(id) {
            Some(record) if record.is_owned_by(owner) => record.entry.resolve(id),
            _ => Err(StoreError::NotFound(id.to_string())),
        }
    }

    pub(crate) fn load_users(&self, owner: Identity) -> Result<BTreeMap<ShortId, Url>> {
        let ids = self
            .owners
            .get(&owner)
            .ok_or_else(|| StoreError::NotFound(owner.to_string()))?;

        Ok(ids
            .iter()
            .filter_map(|id| match &self.records.get(id)?.entry {
                Entry::Live(url) => Some((id.clone(), url.clone())),
                Entry::Deleted => None,
            })
            .collect())
    }

    /// Tombstones the live records among `ids` that `owner` created.
    ///
    /// Returns how many records changed state.
    pub(crate) fn delete_users(&mut self, owner: Identity, ids: &[ShortId]) -> usize {
        let Some(owned) = self.owners.get(&owner) else {
            return 0;
        };

        let mut deleted = 0;
        for id in ids.iter().filter(|id| owned.contains(*id)) {
            if let Some(record) = self.records.get_mut(id) {
                if record.entry.is_live() {
                    record.entry = Entry::Deleted;
                    deleted += 1;
                }
            }
        }
        deleted
    }
}
