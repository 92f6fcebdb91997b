//! Post service.
//!
//! Short text posts in the campus feed or a club/major scope. Posts
//! are append-only; there is no edit or delete path. New posts are
//! handed to the feed publisher so live subscribers see them without
//! polling.

use std::sync::Arc;

use campus_common::{AppError, AppResult, id::IdGenerator};
use campus_db::entities::{post, user};
use campus_db::repositories::{ClubRepository, PostRepository, ProfileRepository};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::services::feed::{FeedItem, FeedPublisher};

/// Where a new post should appear.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "code", rename_all = "camelCase")]
pub enum PostScope {
    /// The campus-wide feed.
    Campus,
    /// A club feed; the author must be a member.
    Club(String),
    /// The author's major feed, taken from their profile.
    MyMajor,
}

impl Default for PostScope {
    fn default() -> Self {
        Self::Campus
    }
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
    #[serde(default)]
    pub scope: PostScope,
}

/// Service for managing posts.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    club_repo: ClubRepository,
    profile_repo: ProfileRepository,
    feed: Arc<dyn FeedPublisher>,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        club_repo: ClubRepository,
        profile_repo: ProfileRepository,
        feed: Arc<dyn FeedPublisher>,
    ) -> Self {
        Self {
            post_repo,
            club_repo,
            profile_repo,
            feed,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new post and notify live subscribers.
    pub async fn create(&self, user: &user::Model, input: CreatePostInput) -> AppResult<post::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let scope = self.resolve_scope(user, input.scope).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(user.id.clone()),
            body: Set(input.body),
            scope: Set(scope),
            created_at: Set(Utc::now().into()),
        };

        let post = self.post_repo.create(model).await?;

        // Delivery is best-effort; the post is already durable
        self.feed.publish(FeedItem::from_post(&post)).await?;

        info!(post_id = %post.id, author = %user.id, "Post created");

        Ok(post)
    }

    /// The campus-wide feed, newest first.
    pub async fn campus_feed(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_campus_feed(limit, until_id).await
    }

    /// A club or major feed, newest first.
    ///
    /// Club feeds require membership; a major feed requires the
    /// viewer's profile to carry that major.
    pub async fn scoped_feed(
        &self,
        user: &user::Model,
        scope: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.ensure_scope_access(user, scope).await?;
        self.post_repo.find_scoped_feed(scope, limit, until_id).await
    }

    /// Posts by one author, newest first.
    pub async fn author_feed(
        &self,
        author_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_author(author_id, limit, until_id).await
    }

    async fn resolve_scope(&self, user: &user::Model, scope: PostScope) -> AppResult<Option<String>> {
        match scope {
            PostScope::Campus => Ok(None),
            PostScope::Club(code) => {
                if !self.club_repo.is_member(&code, &user.id).await? {
                    return Err(AppError::Forbidden(format!(
                        "Not a member of club: {code}"
                    )));
                }
                Ok(Some(code))
            }
            PostScope::MyMajor => {
                let profile = self.profile_repo.get_by_user(&user.id).await?;
                profile.major_code.map(Some).ok_or_else(|| {
                    AppError::Validation(
                        "Set a major on your profile before posting to your major feed"
                            .to_string(),
                    )
                })
            }
        }
    }

    /// Check that a viewer may read a scoped feed.
    ///
    /// Club scopes require membership, major scopes a matching profile.
    /// Site admins may read anything.
    pub async fn ensure_scope_access(&self, user: &user::Model, scope: &str) -> AppResult<()> {
        if user.is_admin {
            return Ok(());
        }

        if self.club_repo.is_member(scope, &user.id).await? {
            return Ok(());
        }

        let profile = self.profile_repo.find_by_user(&user.id).await?;
        if profile.is_some_and(|p| p.major_code.as_deref() == Some(scope)) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "No access to feed scope: {scope}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    use crate::services::feed::NoOpFeedPublisher;

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> PostService {
        PostService::new(
            PostRepository::new(db.clone()),
            ClubRepository::new(db.clone()),
            ProfileRepository::new(db),
            Arc::new(NoOpFeedPublisher),
        )
    }

    fn test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_lowercase(),
            email: None,
            password_hash: "hash".to_string(),
            token: None,
            is_admin: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn empty_body_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service_with(db);

        let input = CreatePostInput {
            body: String::new(),
            scope: PostScope::Campus,
        };

        let result = svc.create(&test_user("u1"), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn campus_post_stores_null_scope() {
        let created = post::Model {
            id: "p1".to_string(),
            author_id: "u1".to_string(),
            body: "hello".to_string(),
            scope: None,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let svc = service_with(db);

        let input = CreatePostInput {
            body: "hello".to_string(),
            scope: PostScope::Campus,
        };

        let post = svc.create(&test_user("u1"), input).await.unwrap();
        assert!(post.scope.is_none());
    }

    #[tokio::test]
    async fn my_major_requires_profile_major() {
        let profile = campus_db::entities::profile::Model {
            user_id: "u1".to_string(),
            full_name: None,
            avatar_url: None,
            major_code: None,
            graduation_year: None,
            club_codes: json!([]),
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile]])
                .into_connection(),
        );
        let svc = service_with(db);

        let input = CreatePostInput {
            body: "hello".to_string(),
            scope: PostScope::MyMajor,
        };

        let result = svc.create(&test_user("u1"), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn scope_deserializes_from_tagged_json() {
        let scope: PostScope = serde_json::from_value(json!({
            "type": "club",
            "code": "ACM"
        }))
        .unwrap();
        assert_eq!(scope, PostScope::Club("ACM".to_string()));
    }
}
