use super::parse_json;
use crate::auth::CurrentUser;
use crate::error::Result;
use crate::model::{BatchRequestItem, BatchResponseItem, ShortenRequest, ShortenResponse};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::{Extension, Json};
use shortcut_shortener::ShortenerService;

/// `POST /` with the target as a plain-text body.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: String,
) -> Result<(StatusCode, String)> {
    let target = ShortenerService::parse_target(&body)?;
    let short_url = state.shortener().shorten(Some(user), &target).await?;
    Ok((StatusCode::CREATED, short_url))
}

pub async fn shorten_api_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<ShortenResponse>)> {
    let request: ShortenRequest = parse_json(&body)?;
    let target = ShortenerService::parse_target(&request.url)?;
    let result = state.shortener().shorten(Some(user), &target).await?;
    Ok((StatusCode::CREATED, Json(ShortenResponse { result })))
}

pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Bytes,
) -> Result<(StatusCode, Json<Vec<BatchResponseItem>>)> {
    let items: Vec<BatchRequestItem> = parse_json(&body)?;
    let response = state.shortener().shorten_batch(Some(user), items).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /{id}`: redirects to the stored target.
pub async fn expand_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let target = state.shortener().expand(&id).await?;
    Ok(Redirect::temporary(target.as_str()))
}
