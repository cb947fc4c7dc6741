use crate::error::{Result, ShortenerError};
use crate::model::{BatchRequestItem, BatchResponseItem, UserUrl};
use shortcut_core::{AuthStore, Identity, ShortId, StoreError, Url};
use std::sync::Arc;
use tracing::{debug, info};

/// Dispatches requests to the owned or anonymous storage operation and
/// composes issued identifiers into short URLs.
///
/// Short URLs have the form `{base_url}/{id}`.
#[derive(Clone)]
pub struct ShortenerService {
    store: Arc<dyn AuthStore>,
    base_url: String,
}

impl std::fmt::Debug for ShortenerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortenerService")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ShortenerService {
    /// Creates a service over `store`. A trailing `/` on `base_url` is
    /// ignored.
    pub fn new(store: Arc<dyn AuthStore>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { store, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parses a caller-supplied target into an absolute URL.
    pub fn parse_target(raw: &str) -> Result<Url> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ShortenerError::InvalidUrl("url cannot be empty".to_string()));
        }
        Url::parse(raw).map_err(|e| ShortenerError::InvalidUrl(format!("'{raw}': {e}")))
    }

    /// Saves one target, owned by `owner` when present.
    pub async fn shorten(&self, owner: Option<Identity>, target: &Url) -> Result<String> {
        let id = match owner {
            Some(owner) => self.store.save_user(owner, target).await?,
            None => self.store.save(target).await?,
        };
        Ok(self.short_url(&id))
    }

    /// Saves every item in one storage call.
    ///
    /// Each response item carries the correlation id of the request item it
    /// was issued for. Nothing is saved if any item holds an invalid URL.
    pub async fn shorten_batch(
        &self,
        owner: Option<Identity>,
        items: Vec<BatchRequestItem>,
    ) -> Result<Vec<BatchResponseItem>> {
        let targets = items
            .iter()
            .map(|item| {
                Self::parse_target(&item.original_url).map_err(|e| match e {
                    ShortenerError::InvalidUrl(msg) => ShortenerError::InvalidUrl(format!(
                        "correlation id '{}': {msg}",
                        item.correlation_id
                    )),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ids = match owner {
            Some(owner) => self.store.save_user_batch(owner, &targets).await?,
            None => self.store.save_batch(&targets).await?,
        };
        let ids = StoreError::check_batch(items.len(), ids)?;
        debug!(count = ids.len(), "shortened url batch");

        Ok(items
            .into_iter()
            .zip(ids)
            .map(|(item, id)| BatchResponseItem {
                correlation_id: item.correlation_id,
                short_url: self.short_url(&id),
            })
            .collect())
    }

    /// Resolves a raw identifier taken from a request path.
    ///
    /// Strings that no store could have issued are reported as not found.
    pub async fn expand(&self, raw_id: &str) -> Result<Url> {
        let id = ShortId::new(raw_id).map_err(|_| ShortenerError::NotFound(raw_id.to_string()))?;
        Ok(self.store.load(&id).await?)
    }

    /// Lists the live short URLs `owner` created, in allocation order.
    ///
    /// An identity without records yields an empty list.
    pub async fn user_urls(&self, owner: Identity) -> Result<Vec<UserUrl>> {
        let urls = match self.store.load_users(owner).await {
            Ok(urls) => urls,
            Err(StoreError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(urls
            .into_iter()
            .map(|(id, url)| UserUrl {
                short_url: self.short_url(&id),
                original_url: url.into(),
            })
            .collect())
    }

    /// Tombstones the listed identifiers that `owner` created.
    ///
    /// Malformed identifiers are skipped like identifiers owned by someone
    /// else.
    pub async fn delete_user_urls(&self, owner: Identity, raw_ids: &[String]) -> Result<()> {
        let ids: Vec<ShortId> = raw_ids
            .iter()
            .filter_map(|raw| ShortId::new(raw.as_str()).ok())
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        self.store.delete_users(owner, &ids).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        Ok(self.store.ping().await?)
    }

    pub async fn close(&self) -> Result<()> {
        self.store.close().await?;
        info!("closed store");
        Ok(())
    }

    fn short_url(&self, id: &ShortId) -> String {
        id.to_url(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortcut_storage::InMemoryStore;

    const BASE_URL: &str = "http://localhost:8080";

    fn test_service() -> ShortenerService {
        ShortenerService::new(Arc::new(InMemoryStore::new()), BASE_URL)
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn item(correlation_id: &str, original_url: &str) -> BatchRequestItem {
        BatchRequestItem {
            correlation_id: correlation_id.to_string(),
            original_url: original_url.to_string(),
        }
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let service = ShortenerService::new(Arc::new(InMemoryStore::new()), "http://short.io/");
        assert_eq!(service.base_url(), "http://short.io");
    }

    #[test]
    fn parse_target_rejects_garbage() {
        assert!(ShortenerService::parse_target("https://example.com/").is_ok());
        assert!(matches!(
            ShortenerService::parse_target(""),
            Err(ShortenerError::InvalidUrl(_))
        ));
        assert!(matches!(
            ShortenerService::parse_target("not a url"),
            Err(ShortenerError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn shorten_composes_short_url() {
        let service = test_service();

        let short = service
            .shorten(None, &url("https://example.com/"))
            .await
            .unwrap();

        assert_eq!(short, "http://localhost:8080/0");
        assert_eq!(
            service.expand("0").await.unwrap().as_str(),
            "https://example.com/"
        );
    }

    #[tokio::test]
    async fn owned_urls_are_listed_for_their_owner_only() {
        let service = test_service();
        let alice = Identity::random();

        service
            .shorten(Some(alice), &url("https://a.com/"))
            .await
            .unwrap();
        service.shorten(None, &url("https://b.com/")).await.unwrap();

        let urls = service.user_urls(alice).await.unwrap();
        assert_eq!(
            urls,
            vec![UserUrl {
                short_url: "http://localhost:8080/0".to_string(),
                original_url: "https://a.com/".to_string(),
            }]
        );
        assert!(service.user_urls(Identity::random()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_echoes_correlation_ids() {
        let service = test_service();

        let response = service
            .shorten_batch(
                None,
                vec![item("x", "https://a.com/"), item("y", "https://b.com/")],
            )
            .await
            .unwrap();

        assert_eq!(
            response,
            vec![
                BatchResponseItem {
                    correlation_id: "x".to_string(),
                    short_url: "http://localhost:8080/0".to_string(),
                },
                BatchResponseItem {
                    correlation_id: "y".to_string(),
                    short_url: "http://localhost:8080/1".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn batch_with_invalid_url_saves_nothing() {
        let service = test_service();

        let err = service
            .shorten_batch(None, vec![item("x", "https://a.com/"), item("y", "nope")])
            .await
            .unwrap_err();

        assert!(matches!(&err, ShortenerError::InvalidUrl(msg) if msg.contains("'y'")));
        assert!(matches!(
            service.expand("0").await,
            Err(ShortenerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleted_urls_disappear() {
        let service = test_service();
        let owner = Identity::random();

        service
            .shorten(Some(owner), &url("https://a.com/"))
            .await
            .unwrap();
        service
            .delete_user_urls(owner, &["0".to_string(), "bad id!".to_string()])
            .await
            .unwrap();

        assert!(matches!(
            service.expand("0").await,
            Err(ShortenerError::Deleted(_))
        ));
        assert!(service.user_urls(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let service = test_service();
        assert!(matches!(
            service.expand("no/such").await,
            Err(ShortenerError::NotFound(_))
        ));
    }
}
