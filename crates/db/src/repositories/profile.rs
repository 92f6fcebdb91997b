//! Profile repository.

use std::sync::Arc;

use campus_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::json;

use crate::entities::{Profile, profile};

/// Repository for profile operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find profile by user ID.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get profile by user ID, returning error if not found.
    pub async fn get_by_user(&self, user_id: &str) -> AppResult<profile::Model> {
        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile not found: {user_id}")))
    }

    /// Create a profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the denormalized club-code mirror.
    pub async fn set_club_codes(
        &self,
        user_id: &str,
        club_codes: &[String],
    ) -> AppResult<profile::Model> {
        let profile = self.get_by_user(user_id).await?;
        let mut active: profile::ActiveModel = profile.into();
        active.club_codes = Set(json!(club_codes));
        active.updated_at = Set(Some(Utc::now().into()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
