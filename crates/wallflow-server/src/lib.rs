//! # wallflow-server
//!
//! REST API for per-user favorite wallpapers.
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | GET | `/api/favorites` | session |
//! | POST | `/api/favorites` | session |
//! | DELETE | `/api/favorites/{id}` | session |
//! | POST | `/api/register` | none |
//! | POST | `/api/login` | none |
//! | POST | `/api/logout` | none |
//! | GET | `/api/user` | session |
//! | GET | `/healthz` | none |
//!
//! A session is an opaque token carried in the `wallflow_session` cookie or
//! an `Authorization: Bearer` header.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{Authenticator, Login, SessionAuthenticator};
pub use error::ApiError;
pub use middleware::CurrentUser;
pub use routes::create_router;
pub use server::WallflowServer;
pub use state::AppState;
