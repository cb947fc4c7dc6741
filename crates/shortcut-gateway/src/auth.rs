//! Cookie-based caller identity.
//!
//! Every request leaves this middleware with a [`CurrentUser`] in its
//! extensions. A missing or undecodable `auth` cookie is replaced by a
//! freshly issued identity, and only then is `Set-Cookie` sent back.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use shortcut_core::Identity;
use tracing::{debug, warn};

use crate::error::Result;
use crate::state::AppState;

/// Name of the cookie carrying the sealed identity.
pub const AUTH_COOKIE: &str = "auth";

/// The identity resolved for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Identity);

pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let existing = jar
        .get(AUTH_COOKIE)
        .and_then(|cookie| match state.codec().decode(cookie.value()) {
            Ok(identity) => Some(identity),
            Err(err) => {
                warn!(error = %err, "rejected auth cookie");
                None
            }
        });

    let (identity, issued) = match existing {
        Some(identity) => (identity, None),
        None => {
            let identity = Identity::random();
            let token = state.codec().encode(identity)?;
            debug!(identity = %identity, "issued new identity");
            let cookie = Cookie::build((AUTH_COOKIE, token))
                .path("/")
                .http_only(true)
                .build();
            (identity, Some(cookie))
        }
    };

    request.extensions_mut().insert(CurrentUser(identity));
    let response = next.run(request).await;

    Ok(match issued {
        Some(cookie) => (jar.add(cookie), response).into_response(),
        None => response,
    })
}
