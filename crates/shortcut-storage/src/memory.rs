use crate::state::State;
use async_trait::async_trait;
use parking_lot::RwLock;
use shortcut_core::{
    AuthStore, BatchStore, Identity, Result, ShortId, Store, StoreError, Url, UrlRecord,
};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// In-memory implementation of the storage contract.
///
/// Nothing survives the process. Mutations take the write lock for their
/// whole duration, so concurrent saves never allocate the same identifier.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn save(&self, target: &Url) -> Result<ShortId> {
        let id = self.state.write().insert(UrlRecord::anonymous(target.clone()));
        debug!(id = %id, "saved url");
        Ok(id)
    }

    async fn load(&self, id: &ShortId) -> Result<Url> {
        trace!(id = %id, "loading url");
        self.state.read().load(id)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl BatchStore for InMemoryStore {
    async fn save_batch(&self, targets: &[Url]) -> Result<Vec<ShortId>> {
        let ids = self.state.write().insert_all(None, targets);
        debug!(count = ids.len(), "saved url batch");
        StoreError::check_batch(targets.len(), ids)
    }
}

#[async_trait]
impl AuthStore for InMemoryStore {
    async fn save_user(&self, owner: Identity, target: &Url) -> Result<ShortId> {
        let id = self
            .state
            .write()
            .insert(UrlRecord::owned(owner, target.clone()));
        debug!(id = %id, owner = %owner, "saved user url");
        Ok(id)
    }

    async fn save_user_batch(&self, owner: Identity, targets: &[Url]) -> Result<Vec<ShortId>> {
        let ids = self.state.write().insert_all(Some(owner), targets);
        debug!(count = ids.len(), owner = %owner, "saved user url batch");
        StoreError::check_batch(targets.len(), ids)
    }

    async fn load_user(&self, owner: Identity, id: &ShortId) -> Result<Url> {
        trace!(id = %id, owner = %owner, "loading user url");
        self.state.read().load_user(owner, id)
    }

    async fn load_users(&self, owner: Identity) -> Result<BTreeMap<ShortId, Url>> {
        trace!(owner = %owner, "loading user urls");
        self.state.read().load_users(owner)
    }

    async fn delete_users(&self, owner: Identity, ids: &[ShortId]) -> Result<()> {
        let deleted = self.state.write().delete_users(owner, ids);
        debug!(owner = %owner, requested = ids.len(), deleted, "deleted user urls");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn id(s: &str) -> ShortId {
        ShortId::new_unchecked(s)
    }

    #[tokio::test]
    async fn sequential_ids_on_empty_store() {
        let store = InMemoryStore::new();

        let first = store.save(&url("https://example.com/")).await.unwrap();
        let second = store.save(&url("https://other.com/")).await.unwrap();

        assert_eq!(first.as_str(), "0");
        assert_eq!(second.as_str(), "1");
        assert_eq!(
            store.load(&id("0")).await.unwrap().as_str(),
            "https://example.com/"
        );
        assert!(matches!(
            store.load(&id("2")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_visible_through_both_paths() {
        let store = InMemoryStore::new();
        let owner = Identity::random();

        let saved = store.save_user(owner, &url("https://a.com/")).await.unwrap();
        store.delete_users(owner, &[saved.clone()]).await.unwrap();

        assert!(matches!(
            store.load_user(owner, &saved).await,
            Err(StoreError::Deleted(_))
        ));
        assert!(matches!(store.load(&saved).await, Err(StoreError::Deleted(_))));
    }

    #[tokio::test]
    async fn load_users_for_unknown_identity() {
        let store = InMemoryStore::new();
        store.save(&url("https://a.com/")).await.unwrap();

        assert!(matches!(
            store.load_users(Identity::random()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn ping_and_close_always_succeed() {
        let store = InMemoryStore::new();
        store.ping().await.unwrap();
        store.close().await.unwrap();
        store.close().await.unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_saves_get_distinct_ids() {
        let store = Arc::new(InMemoryStore::new());
        let mut handles = vec![];

        for i in 0..32u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .save(&url(&format!("https://example{i}.com/")))
                    .await
                    .unwrap()
            }));
        }

        let mut ids = vec![];
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 32);
        assert_eq!(ids.first().unwrap().as_str(), "0");
        assert_eq!(ids.last().unwrap().as_str(), "1f");
    }
}
