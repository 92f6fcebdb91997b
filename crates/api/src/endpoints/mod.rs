//! API endpoints.

mod auth;
mod clubs;
mod events;
mod files;
mod posts;
mod profiles;

use axum::Router;

use crate::middleware::AppState;
use crate::sse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/posts", posts::router())
        .nest("/events", events::router())
        .nest("/clubs", clubs::router())
        .nest("/profiles", profiles::router())
        .nest("/files", files::router())
        .nest("/streaming/sse", sse::router())
}
