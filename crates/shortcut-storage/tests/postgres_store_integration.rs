//! These tests start a PostgreSQL container and need a Docker daemon.
//! Run them with `cargo test -- --ignored`.

use std::time::Duration;

use shortcut_core::{Identity, ShortId, Url};
use shortcut_storage::{AuthStore, BatchStore, PostgresStore, Store, StoreError};
use shortcut_test_infra::postgres::{PostgresConfig, PostgresServer};
use sqlx::postgres::PgPoolOptions;

struct Fixture {
    _postgres: PostgresServer,
    store: PostgresStore,
}

impl Fixture {
    async fn start() -> Self {
        let postgres = PostgresServer::new(PostgresConfig::builder().build())
            .await
            .expect("start postgres");
        let url = postgres.database_url().await.expect("postgres url");
        let pool = connect_with_retry(&url).await;

        let store = PostgresStore::new(pool);
        store.bootstrap().await.expect("create schema");

        Self {
            _postgres: postgres,
            store,
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::PgPool {
    let mut last_error = None;

    for _ in 0..20 {
        match PgPoolOptions::new().max_connections(5).connect(url).await {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect postgres: {last_error:?}");
}

fn url(value: &str) -> Url {
    Url::parse(value).unwrap()
}

#[tokio::test]
#[ignore = "requires docker"]
async fn save_and_load() {
    let fixture = Fixture::start().await;

    let id = fixture.store.save(&url("https://example.com/")).await.unwrap();

    assert_eq!(
        fixture.store.load(&id).await.unwrap().as_str(),
        "https://example.com/"
    );
}

#[tokio::test]
#[ignore = "requires docker"]
async fn ids_are_monotonic() {
    let fixture = Fixture::start().await;

    let first = fixture.store.save(&url("https://a.com/")).await.unwrap();
    let second = fixture.store.save(&url("https://b.com/")).await.unwrap();

    assert!(second.to_row_id().unwrap() > first.to_row_id().unwrap());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn unknown_ids_are_not_found() {
    let fixture = Fixture::start().await;

    for raw in ["999999", "abc", "0"] {
        let err = fixture
            .store
            .load(&ShortId::new_unchecked(raw))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)), "{raw}: {err}");
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn batch_preserves_order() {
    let fixture = Fixture::start().await;
    let targets = vec![url("https://a.com/"), url("https://b.com/"), url("https://c.com/")];

    let ids = fixture.store.save_batch(&targets).await.unwrap();

    assert_eq!(ids.len(), 3);
    for (id, target) in ids.iter().zip(&targets) {
        assert_eq!(&fixture.store.load(id).await.unwrap(), target);
    }
    assert!(fixture.store.save_batch(&[]).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn user_records_are_scoped() {
    let fixture = Fixture::start().await;
    let alice = Identity::random();
    let bob = Identity::random();

    let ids = fixture
        .store
        .save_user_batch(alice, &[url("https://a.com/"), url("https://b.com/")])
        .await
        .unwrap();
    fixture
        .store
        .save_user(bob, &url("https://bob.com/"))
        .await
        .unwrap();

    let owned = fixture.store.load_users(alice).await.unwrap();
    assert_eq!(owned.keys().cloned().collect::<Vec<_>>(), ids);
    assert!(matches!(
        fixture.store.load_user(bob, &ids[0]).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        fixture.store.load_users(Identity::random()).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn delete_tombstones_owned_rows_only() {
    let fixture = Fixture::start().await;
    let alice = Identity::random();
    let bob = Identity::random();

    let alice_id = fixture
        .store
        .save_user(alice, &url("https://a.com/"))
        .await
        .unwrap();
    let bob_id = fixture
        .store
        .save_user(bob, &url("https://b.com/"))
        .await
        .unwrap();

    fixture
        .store
        .delete_users(alice, &[alice_id.clone(), bob_id.clone()])
        .await
        .unwrap();
    fixture
        .store
        .delete_users(alice, &[alice_id.clone()])
        .await
        .unwrap();

    assert!(matches!(
        fixture.store.load(&alice_id).await,
        Err(StoreError::Deleted(_))
    ));
    assert!(matches!(
        fixture.store.load_user(alice, &alice_id).await,
        Err(StoreError::Deleted(_))
    ));
    assert!(fixture.store.load_users(alice).await.unwrap().is_empty());
    assert!(fixture.store.load(&bob_id).await.is_ok());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn ping_fails_after_close() {
    let fixture = Fixture::start().await;

    fixture.store.ping().await.unwrap();
    fixture.store.close().await.unwrap();
    fixture.store.close().await.unwrap();

    assert!(fixture.store.ping().await.is_err());
}
