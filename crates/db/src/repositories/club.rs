//! Club repository.

use std::sync::Arc;

use campus_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{Club, ClubMember, club, club_member};

/// Repository for club and membership operations.
#[derive(Clone)]
pub struct ClubRepository {
    db: Arc<DatabaseConnection>,
}

impl ClubRepository {
    /// Create a new club repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Club Operations ====================

    /// Find club by code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<club::Model>> {
        Club::find_by_id(code)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get club by code, returning error if not found.
    pub async fn get_by_code(&self, code: &str) -> AppResult<club::Model> {
        self.find_by_code(code)
            .await?
            .ok_or_else(|| AppError::ClubNotFound(code.to_string()))
    }

    /// List active clubs ordered by name.
    pub async fn find_active(&self, limit: u64, offset: u64) -> AppResult<Vec<club::Model>> {
        Club::find()
            .filter(club::Column::IsActive.eq(true))
            .order_by(club::Column::Name, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search active clubs by name or code substring.
    pub async fn search(&self, query: &str, limit: u64, offset: u64) -> AppResult<Vec<club::Model>> {
        Club::find()
            .filter(club::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(club::Column::Name.contains(query))
                    .add(club::Column::Code.contains(query)),
            )
            .order_by(club::Column::Name, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new club.
    pub async fn create(&self, model: club::ActiveModel) -> AppResult<club::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a club.
    pub async fn update(&self, model: club::ActiveModel) -> AppResult<club::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Membership Operations ====================

    /// Find a membership record.
    pub async fn find_member(
        &self,
        club_code: &str,
        user_id: &str,
    ) -> AppResult<Option<club_member::Model>> {
        ClubMember::find()
            .filter(club_member::Column::ClubCode.eq(club_code))
            .filter(club_member::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a user is a member of a club.
    pub async fn is_member(&self, club_code: &str, user_id: &str) -> AppResult<bool> {
        let count = ClubMember::find()
            .filter(club_member::Column::ClubCode.eq(club_code))
            .filter(club_member::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// List members of a club.
    pub async fn list_members(
        &self,
        club_code: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<club_member::Model>> {
        ClubMember::find()
            .filter(club_member::Column::ClubCode.eq(club_code))
            .order_by(club_member::Column::JoinedAt, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all memberships for a user.
    pub async fn find_memberships(&self, user_id: &str) -> AppResult<Vec<club_member::Model>> {
        ClubMember::find()
            .filter(club_member::Column::UserId.eq(user_id))
            .order_by(club_member::Column::ClubCode, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Club codes where the user holds an officer-capable role.
    pub async fn officer_club_codes(&self, user_id: &str) -> AppResult<Vec<String>> {
        let memberships = self.find_memberships(user_id).await?;

        Ok(memberships
            .into_iter()
            .filter(|m| m.role.is_officer())
            .map(|m| m.club_code)
            .collect())
    }

    /// Add a member to a club.
    pub async fn add_member(
        &self,
        model: club_member::ActiveModel,
    ) -> AppResult<club_member::Model> {
        let member = model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.increment_members_count(&member.club_code).await?;

        Ok(member)
    }

    /// Remove a member from a club.
    pub async fn remove_member(&self, club_code: &str, user_id: &str) -> AppResult<()> {
        let deleted = ClubMember::delete_many()
            .filter(club_member::Column::ClubCode.eq(club_code))
            .filter(club_member::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected > 0 {
            self.decrement_members_count(club_code).await?;
        }

        Ok(())
    }

    /// Change a member's role.
    pub async fn set_member_role(
        &self,
        club_code: &str,
        user_id: &str,
        role: club_member::ClubRole,
    ) -> AppResult<club_member::Model> {
        let member = self
            .find_member(club_code, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Not a member of {club_code}")))?;

        let mut active: club_member::ActiveModel = member.into();
        active.role = Set(role);

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment members count atomically.
    async fn increment_members_count(&self, code: &str) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        Club::update_many()
            .col_expr(
                club::Column::MembersCount,
                Expr::col(club::Column::MembersCount).add(1),
            )
            .filter(club::Column::Code.eq(code))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Decrement members count atomically.
    async fn decrement_members_count(&self, code: &str) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        Club::update_many()
            .col_expr(
                club::Column::MembersCount,
                Expr::cust("GREATEST(members_count - 1, 0)"),
            )
            .filter(club::Column::Code.eq(code))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::club_member::ClubRole;

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_club(code: &str, name: &str) -> club::Model {
        club::Model {
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            cover_image_url: None,
            is_active: true,
            members_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_member(club_code: &str, user_id: &str, role: ClubRole) -> club_member::Model {
        club_member::Model {
            id: format!("{club_code}-{user_id}"),
            club_code: club_code.to_string(),
            user_id: user_id.to_string(),
            role,
            joined_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_code() {
        let club = create_test_club("ACM", "ACM Chapter");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[club.clone()]])
                .into_connection(),
        );

        let repo = ClubRepository::new(db);
        let result = repo.find_by_code("ACM").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().name, "ACM Chapter");
    }

    #[tokio::test]
    async fn test_officer_club_codes_filters_plain_members() {
        let memberships = vec![
            create_test_member("ACM", "u1", ClubRole::Officer),
            create_test_member("SWE", "u1", ClubRole::Member),
            create_test_member("GDC", "u1", ClubRole::Admin),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([memberships])
                .into_connection(),
        );

        let repo = ClubRepository::new(db);
        let codes = repo.officer_club_codes("u1").await.unwrap();

        assert_eq!(codes, vec!["ACM".to_string(), "GDC".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_member_missing_is_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = ClubRepository::new(db);
        let result = repo.remove_member("ACM", "u1").await;

        assert!(result.is_ok());
    }
}
