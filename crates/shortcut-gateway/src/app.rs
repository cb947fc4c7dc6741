use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::handlers::{
    delete_user_urls_handler, expand_handler, ping_handler, shorten_api_handler,
    shorten_batch_handler, shorten_handler, user_urls_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", post(shorten_handler))
            .route("/ping", get(ping_handler))
            .route("/{id}", get(expand_handler))
            .route("/user/urls", get(user_urls_handler))
            .nest(
                "/api",
                Router::new()
                    .route("/shorten", post(shorten_api_handler))
                    .route("/shorten/batch", post(shorten_batch_handler))
                    .route(
                        "/user/urls",
                        get(user_urls_handler).delete(delete_user_urls_handler),
                    ),
            )
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestDecompressionLayer::new().gzip(true))
                    .layer(CompressionLayer::new().gzip(true)),
            )
            .with_state(state)
    }
}
