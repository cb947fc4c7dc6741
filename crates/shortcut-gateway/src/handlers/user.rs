use super::parse_json;
use crate::auth::CurrentUser;
use crate::error::Result;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

/// Lists the caller's live short URLs, or `204` when there are none.
pub async fn user_urls_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response> {
    let urls = state.shortener().user_urls(user).await?;
    if urls.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(urls).into_response())
}

/// Accepts a JSON list of identifiers to tombstone.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Bytes,
) -> Result<StatusCode> {
    let ids: Vec<String> = parse_json(&body)?;
    state.shortener().delete_user_urls(user, &ids).await?;
    Ok(StatusCode::ACCEPTED)
}
