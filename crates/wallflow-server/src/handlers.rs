//! HTTP handlers.

use crate::auth::Login;
use crate::error::ApiError;
use crate::middleware::{CurrentUser, clear_cookie, session_cookie, session_token};
use crate::state::AppState;
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use wallflow_core::{Favorite, FavoriteId, NewFavorite, User};

// =============================================================================
// Favorites
// =============================================================================

pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Favorite>>, ApiError> {
    let favorites = state.favorites().get_favorites(current.id()).await?;
    Ok(Json(favorites))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    body: Bytes,
) -> Result<Json<Favorite>, ApiError> {
    let favorite = parse_new_favorite(&body)?;
    let favorite = state
        .favorites()
        .add_favorite(current.id(), favorite)
        .await?;

    tracing::debug!(user_id = %current.id(), favorite_id = %favorite.id, "Added favorite");
    Ok(Json(favorite))
}

/// Always 200 for an authenticated caller, whether or not anything was
/// deleted.
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match parse_favorite_id(&id) {
        Some(id) => state.favorites().remove_favorite(id, current.id()).await?,
        None => tracing::debug!(id = %id, "Ignoring delete of malformed favorite id"),
    }
    Ok(StatusCode::OK)
}

/// Both fields must be non-empty strings.
fn parse_new_favorite(body: &[u8]) -> Result<NewFavorite, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("body is not valid JSON: {e}")))?;

    let field = |name: &str| -> Result<String, ApiError> {
        match value.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            _ => Err(ApiError::validation(format!("{name} must be a non-empty string"))),
        }
    };

    Ok(NewFavorite {
        image_url: field("imageUrl")?,
        title: field("title")?,
    })
}

fn parse_favorite_id(raw: &str) -> Option<FavoriteId> {
    raw.parse::<u64>().ok().filter(|id| *id > 0).map(FavoriteId)
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn register(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let creds = parse_credentials(&body)?;
    let login = state
        .sessions()
        .register(&creds.username, &creds.password)
        .await?;
    Ok(with_session(&state, StatusCode::CREATED, login))
}

pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let creds = parse_credentials(&body).map_err(|_| ApiError::InvalidCredentials)?;
    let login = state
        .sessions()
        .login(&creds.username, &creds.password)
        .await?;
    Ok(with_session(&state, StatusCode::OK, login))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers, state.cookie_name()) {
        state.sessions().logout(&token).await;
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_cookie(state.cookie_name()))],
    )
        .into_response()
}

pub async fn current_user(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}

fn parse_credentials(body: &[u8]) -> Result<Credentials, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("body is not valid credentials JSON: {e}")))
}

fn with_session(state: &AppState, status: StatusCode, login: Login) -> Response {
    let cookie = session_cookie(state.cookie_name(), &login.token, state.sessions().ttl_secs());
    (status, [(header::SET_COOKIE, cookie)], Json(login.user)).into_response()
}

// =============================================================================
// Health
// =============================================================================

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
