//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use campus_common::storage::StorageBackend;
use campus_core::{
    AccountService, ClubService, EventService, FeedBroadcaster, PostService, ProfileService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub profile_service: ProfileService,
    pub club_service: ClubService,
    pub event_service: EventService,
    pub post_service: PostService,
    pub feed_broadcaster: FeedBroadcaster,
    pub storage: Arc<dyn StorageBackend>,
}

/// Authentication middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Try to extract token from header
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        // Authenticate user by token
        if let Ok(user) = state.account_service.authenticate(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
