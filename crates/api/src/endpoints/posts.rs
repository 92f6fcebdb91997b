//! Post endpoints.

use axum::{Json, Router, extract::State, routing::post};
use campus_common::AppResult;
use campus_core::CreatePostInput;
use campus_db::entities::post;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub body: String,
    pub scope: Option<String>,
    pub created_at: String,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            author_id: p.author_id,
            body: p.body,
            scope: p.scope,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Campus feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Scoped feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedFeedRequest {
    pub scope: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Author feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorFeedRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

// ==================== Handlers ====================

/// Create a new post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&user, input).await?;

    Ok(ApiResponse::ok(post.into()))
}

/// Campus-wide feed.
async fn campus_feed(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FeedRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let limit = req.limit.min(100);
    let posts = state
        .post_service
        .campus_feed(limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Club or major feed.
async fn scoped_feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ScopedFeedRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let limit = req.limit.min(100);
    let posts = state
        .post_service
        .scoped_feed(&user, &req.scope, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Posts by one author.
async fn by_author(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AuthorFeedRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let limit = req.limit.min(100);
    let posts = state
        .post_service
        .author_feed(&req.user_id, limit, req.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/feed", post(campus_feed))
        .route("/feed/scoped", post(scoped_feed))
        .route("/by-author", post(by_author))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use campus_common::storage::LocalStorage;
    use campus_core::{
        AccountService, ClubService, EventService, FeedBroadcaster, NoOpFeedPublisher,
        PostService, ProfileService,
    };
    use campus_db::repositories::{
        ClubRepository, EventRepository, MajorRepository, PostRepository, ProfileRepository,
        UserRepository,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        AppState {
            account_service: AccountService::new(
                UserRepository::new(db.clone()),
                ProfileRepository::new(db.clone()),
            ),
            profile_service: ProfileService::new(
                ProfileRepository::new(db.clone()),
                MajorRepository::new(db.clone()),
            ),
            club_service: ClubService::new(
                ClubRepository::new(db.clone()),
                ProfileRepository::new(db.clone()),
            ),
            event_service: EventService::new(
                EventRepository::new(db.clone()),
                ClubRepository::new(db.clone()),
            ),
            post_service: PostService::new(
                PostRepository::new(db.clone()),
                ClubRepository::new(db.clone()),
                ProfileRepository::new(db),
                Arc::new(NoOpFeedPublisher),
            ),
            feed_broadcaster: FeedBroadcaster::new(),
            storage: Arc::new(LocalStorage::new(
                std::env::temp_dir(),
                "http://localhost/files".to_string(),
            )),
        }
    }

    #[tokio::test]
    async fn posts_cannot_be_deleted_over_the_api() {
        let app = router().with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/delete")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"postId":"p1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
