//! The auth gate in front of the favorites routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use wallflow_core::{User, UserId};

/// The authenticated caller, available to handlers as an
/// `Extension<CurrentUser>`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
}

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

/// Reject the request with 401 unless it carries a live session for a user
/// that exists in the store.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers(), state.cookie_name()).ok_or(ApiError::Unauthenticated)?;
    let user_id = state
        .gate()
        .resolve(&token)
        .await
        .ok_or(ApiError::Unauthenticated)?;
    let user = state.users().get_user(user_id).await?.ok_or_else(|| {
        tracing::debug!(user_id = %user_id, "Session resolved to an unknown user");
        ApiError::Unauthenticated
    })?;

    req.extensions_mut().insert(CurrentUser { user });
    Ok(next.run(req).await)
}

/// Session token from the named cookie, falling back to
/// `Authorization: Bearer <token>`.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(cookies) = value.to_str() else {
            continue;
        };
        if let Some(token) = cookie_value(cookies, cookie_name) {
            return Some(token);
        }
    }

    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let rest = auth.strip_prefix("Bearer ")?.trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// `Set-Cookie` value that stores `token` for `max_age` seconds.
pub fn session_cookie(name: &str, token: &str, max_age: i64) -> String {
    format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}")
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_cookie(name: &str) -> String {
    session_cookie(name, "", 0)
}
