use clap::Parser;
use shortcut_auth::{AuthKey, IdentityCodec};
use shortcut_core::{AuthStore, StoreError};
use shortcut_gateway::cli::{Backend, Cli};
use shortcut_gateway::{App, AppState};
use shortcut_shortener::ShortenerService;
use shortcut_storage::{FileStore, InMemoryStore, PostgresStore};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::try_parse()?;
    shortcut_telemetry::init(config.log_format)?;

    let backend = config.backend();
    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %backend,
        "starting shortener server"
    );

    let key = match config.auth_secret.clone() {
        Some(key) => key,
        None => {
            warn!(
                "no auth secret configured, generated a random key; \
                 issued cookies will not survive a restart"
            );
            AuthKey::generate()
        }
    };

    let store = open_store(backend).await?;
    let shortener = ShortenerService::new(store, config.base_url.as_str());
    let state = AppState::new(shortener.clone(), IdentityCodec::new(&key));

    let listener = tokio::net::TcpListener::bind(config.listen_addr.as_str()).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shortener.close().await?;
    info!("shortener server stopped");
    Ok(())
}

async fn open_store(backend: Backend<'_>) -> Result<Arc<dyn AuthStore>, StoreError> {
    let store: Arc<dyn AuthStore> = match backend {
        Backend::Postgres(dsn) => {
            let store = PostgresStore::connect(dsn).await?;
            store.bootstrap().await?;
            Arc::new(store)
        }
        Backend::File(path) => Arc::new(FileStore::open(path)?),
        Backend::InMemory => Arc::new(InMemoryStore::new()),
    };
    Ok(store)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            error!(error = %err, "cannot listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
