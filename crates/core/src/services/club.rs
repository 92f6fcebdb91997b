//! Club service.
//!
//! Club directory, membership, and roles. Membership changes keep two
//! denormalized views in sync: the club's `members_count` and the
//! profile's club-code mirror used for fast feed checks.

use campus_common::{AppError, AppResult, id::IdGenerator};
use campus_db::entities::{club, club_member, user};
use campus_db::entities::club_member::ClubRole;
use campus_db::repositories::{ClubRepository, ProfileRepository};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

/// Input for creating a club.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubInput {
    #[validate(length(min = 2, max = 32), custom(function = validate_code))]
    pub code: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Input for updating a club.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubInput {
    pub code: String,
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 4096))]
    pub description: Option<Option<String>>,
    pub cover_image_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}

fn validate_code(code: &str) -> Result<(), validator::ValidationError> {
    if code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("club_code"))
    }
}

/// Service for managing clubs and memberships.
#[derive(Clone)]
pub struct ClubService {
    club_repo: ClubRepository,
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

impl ClubService {
    /// Create a new club service.
    #[must_use]
    pub const fn new(club_repo: ClubRepository, profile_repo: ProfileRepository) -> Self {
        Self {
            club_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a club by code.
    pub async fn get_by_code(&self, code: &str) -> AppResult<club::Model> {
        self.club_repo.get_by_code(code).await
    }

    /// List active clubs.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<club::Model>> {
        self.club_repo.find_active(limit, offset).await
    }

    /// Search the directory by name or code.
    pub async fn search(&self, query: &str, limit: u64, offset: u64) -> AppResult<Vec<club::Model>> {
        if query.trim().is_empty() {
            return self.list(limit, offset).await;
        }

        self.club_repo.search(query.trim(), limit, offset).await
    }

    /// Create a new club. Site admins only.
    pub async fn create(&self, user: &user::Model, input: CreateClubInput) -> AppResult<club::Model> {
        if !user.is_admin {
            return Err(AppError::Forbidden(
                "Only admins can create clubs".to_string(),
            ));
        }

        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.club_repo.find_by_code(&input.code).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Club already exists: {}",
                input.code
            )));
        }

        let model = club::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            cover_image_url: Set(input.cover_image_url),
            is_active: Set(true),
            members_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let club = self.club_repo.create(model).await?;

        info!(club = %club.code, "Club created");

        Ok(club)
    }

    /// Update a club. Site admins or club admins.
    pub async fn update(&self, user: &user::Model, input: UpdateClubInput) -> AppResult<club::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let club = self.club_repo.get_by_code(&input.code).await?;
        self.require_manager(user, &club.code).await?;

        let mut active: club::ActiveModel = club.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(cover_image_url) = input.cover_image_url {
            active.cover_image_url = Set(cover_image_url);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.club_repo.update(active).await
    }

    // ==================== Membership ====================

    /// List members of a club.
    pub async fn list_members(
        &self,
        club_code: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<club_member::Model>> {
        self.club_repo.get_by_code(club_code).await?;
        self.club_repo.list_members(club_code, limit, offset).await
    }

    /// List a user's memberships.
    pub async fn list_memberships(&self, user_id: &str) -> AppResult<Vec<club_member::Model>> {
        self.club_repo.find_memberships(user_id).await
    }

    /// Join a club as a plain member.
    pub async fn join(&self, user: &user::Model, club_code: &str) -> AppResult<club_member::Model> {
        let club = self.club_repo.get_by_code(club_code).await?;

        if !club.is_active {
            return Err(AppError::Validation(
                "Cannot join an inactive club".to_string(),
            ));
        }

        if self.club_repo.is_member(club_code, &user.id).await? {
            return Err(AppError::Conflict(
                "Already a member of this club".to_string(),
            ));
        }

        let model = club_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            club_code: Set(club_code.to_string()),
            user_id: Set(user.id.clone()),
            role: Set(ClubRole::Member),
            joined_at: Set(Utc::now().into()),
        };

        let member = self.club_repo.add_member(model).await?;
        self.sync_profile_mirror(&user.id).await?;

        info!(club = %club_code, user = %user.id, "Member joined");

        Ok(member)
    }

    /// Leave a club. Leaving a club you are not in is a no-op.
    pub async fn leave(&self, user: &user::Model, club_code: &str) -> AppResult<()> {
        self.club_repo.get_by_code(club_code).await?;
        self.club_repo.remove_member(club_code, &user.id).await?;
        self.sync_profile_mirror(&user.id).await?;

        Ok(())
    }

    /// Change a member's role. Site admins or club admins.
    pub async fn set_member_role(
        &self,
        user: &user::Model,
        club_code: &str,
        member_user_id: &str,
        role: ClubRole,
    ) -> AppResult<club_member::Model> {
        self.club_repo.get_by_code(club_code).await?;
        self.require_manager(user, club_code).await?;

        self.club_repo
            .set_member_role(club_code, member_user_id, role)
            .await
    }

    /// Check that a user may manage a club. Site admins or club admins.
    ///
    /// Lets callers verify rights before doing side-effectful work on
    /// the club's behalf, such as storing an uploaded cover image.
    pub async fn ensure_can_manage(&self, user: &user::Model, club_code: &str) -> AppResult<()> {
        self.club_repo.get_by_code(club_code).await?;
        self.require_manager(user, club_code).await
    }

    async fn require_manager(&self, user: &user::Model, club_code: &str) -> AppResult<()> {
        if user.is_admin {
            return Ok(());
        }

        let member = self.club_repo.find_member(club_code, &user.id).await?;
        if member.is_some_and(|m| m.role.can_manage_members()) {
            return Ok(());
        }

        Err(AppError::Forbidden(
            "Not allowed to manage this club".to_string(),
        ))
    }

    /// Rebuild the profile's club-code mirror from memberships.
    async fn sync_profile_mirror(&self, user_id: &str) -> AppResult<()> {
        let memberships = self.club_repo.find_memberships(user_id).await?;
        let codes: Vec<String> = memberships.into_iter().map(|m| m.club_code).collect();

        // Profiles are created at signup; a missing one here is a bug
        // elsewhere, but membership should not fail because of it.
        if self.profile_repo.find_by_user(user_id).await?.is_some() {
            self.profile_repo.set_club_codes(user_id, &codes).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> ClubService {
        ClubService::new(ClubRepository::new(db.clone()), ProfileRepository::new(db))
    }

    fn test_user(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_lowercase(),
            email: None,
            password_hash: "hash".to_string(),
            token: None,
            is_admin,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn non_admin_cannot_create_club() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service_with(db);

        let input = CreateClubInput {
            code: "ACM".to_string(),
            name: "ACM Chapter".to_string(),
            description: None,
            cover_image_url: None,
        };

        let result = svc.create(&test_user("u1", false), input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn invalid_club_code_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service_with(db);

        let input = CreateClubInput {
            code: "not a code!".to_string(),
            name: "Bad".to_string(),
            description: None,
            cover_image_url: None,
        };

        let result = svc.create(&test_user("a1", true), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn join_inactive_club_rejected() {
        let club = club::Model {
            code: "OLD".to_string(),
            name: "Defunct".to_string(),
            description: None,
            cover_image_url: None,
            is_active: false,
            members_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[club]])
                .into_connection(),
        );
        let svc = service_with(db);

        let result = svc.join(&test_user("u1", false), "OLD").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn plain_member_cannot_manage_club() {
        let club = club::Model {
            code: "ACM".to_string(),
            name: "ACM Chapter".to_string(),
            description: None,
            cover_image_url: None,
            is_active: true,
            members_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let member = club_member::Model {
            id: "m1".to_string(),
            club_code: "ACM".to_string(),
            user_id: "u1".to_string(),
            role: ClubRole::Member,
            joined_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[club]])
                .append_query_results([[member]])
                .into_connection(),
        );
        let svc = service_with(db);

        let result = svc.ensure_can_manage(&test_user("u1", false), "ACM").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
