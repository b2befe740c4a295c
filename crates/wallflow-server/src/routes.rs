//! Route definitions for the API server.

use crate::handlers;
use crate::middleware::require_user;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let gated = Router::new()
        .route(
            "/api/favorites",
            get(handlers::list_favorites).post(handlers::add_favorite),
        )
        .route("/api/favorites/{id}", delete(handlers::remove_favorite))
        .route("/api/user", get(handlers::current_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let open = Router::new()
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/healthz", get(handlers::healthz));

    gated
        .merge(open)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
