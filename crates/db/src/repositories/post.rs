//! Post repository.
//!
//! Posts are append-only: rows are created and listed, never updated
//! or deleted.

use std::sync::Arc;

use campus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entities::{Post, post};

/// Repository for post operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Campus-wide feed, newest first.
    ///
    /// Pagination is keyset-based: IDs are ULIDs, so `id < until_id`
    /// walks backwards in time.
    pub async fn find_campus_feed(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().filter(post::Column::Scope.is_null());

        if let Some(until) = until_id {
            query = query.filter(post::Column::Id.lt(until));
        }

        query
            .order_by(post::Column::Id, Order::Desc)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Scoped feed for a club or major, newest first.
    pub async fn find_scoped_feed(
        &self,
        scope: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().filter(post::Column::Scope.eq(scope));

        if let Some(until) = until_id {
            query = query.filter(post::Column::Id.lt(until));
        }

        query
            .order_by(post::Column::Id, Order::Desc)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List posts by an author, newest first.
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().filter(post::Column::AuthorId.eq(author_id));

        if let Some(until) = until_id {
            query = query.filter(post::Column::Id.lt(until));
        }

        query
            .order_by(post::Column::Id, Order::Desc)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_post(id: &str, scope: Option<&str>) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: "u1".to_string(),
            body: "hello campus".to_string(),
            scope: scope.map(String::from),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_campus_feed() {
        let posts = vec![
            create_test_post("01b", None),
            create_test_post("01a", None),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([posts])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_campus_feed(10, None).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "01b");
    }

    #[tokio::test]
    async fn test_find_scoped_feed_filters_by_scope() {
        let posts = vec![create_test_post("01a", Some("ACM"))];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([posts])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_scoped_feed("ACM", 10, None).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].scope.as_deref(), Some("ACM"));
    }
}
