//! Profile service.

use campus_common::{AppError, AppResult};
use campus_db::entities::{major, profile};
use campus_db::repositories::{MajorRepository, ProfileRepository};
use chrono::{Datelike, Utc};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for updating a profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 128))]
    pub full_name: Option<Option<String>>,
    /// Major code; validated against the majors catalog.
    pub major_code: Option<Option<String>>,
    pub graduation_year: Option<Option<i32>>,
}

/// Service for student profiles.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    major_repo: MajorRepository,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository, major_repo: MajorRepository) -> Self {
        Self {
            profile_repo,
            major_repo,
        }
    }

    /// Get a user's profile.
    pub async fn get(&self, user_id: &str) -> AppResult<profile::Model> {
        self.profile_repo.get_by_user(user_id).await
    }

    /// List the majors catalog.
    pub async fn list_majors(&self) -> AppResult<Vec<major::Model>> {
        self.major_repo.list().await
    }

    /// Update a user's own profile.
    pub async fn update(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<profile::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(Some(ref code)) = input.major_code {
            if self.major_repo.find_by_code(code).await?.is_none() {
                return Err(AppError::Validation(format!("Unknown major: {code}")));
            }
        }

        if let Some(Some(year)) = input.graduation_year {
            if year < Utc::now().year() {
                return Err(AppError::Validation(
                    "Graduation year cannot be in the past".to_string(),
                ));
            }
        }

        let profile = self.profile_repo.get_by_user(user_id).await?;
        let mut active: profile::ActiveModel = profile.into();

        if let Some(full_name) = input.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(major_code) = input.major_code {
            active.major_code = Set(major_code);
        }
        if let Some(graduation_year) = input.graduation_year {
            active.graduation_year = Set(graduation_year);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.profile_repo.update(active).await
    }

    /// Set the avatar URL after an upload.
    pub async fn set_avatar(&self, user_id: &str, url: Option<String>) -> AppResult<profile::Model> {
        let profile = self.profile_repo.get_by_user(user_id).await?;
        let mut active: profile::ActiveModel = profile.into();
        active.avatar_url = Set(url);
        active.updated_at = Set(Some(Utc::now().into()));

        self.profile_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> ProfileService {
        ProfileService::new(ProfileRepository::new(db.clone()), MajorRepository::new(db))
    }

    fn test_profile(user_id: &str) -> profile::Model {
        profile::Model {
            user_id: user_id.to_string(),
            full_name: None,
            avatar_url: None,
            major_code: None,
            graduation_year: None,
            club_codes: json!([]),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn unknown_major_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<major::Model>::new()])
                .into_connection(),
        );
        let svc = service_with(db);

        let input = UpdateProfileInput {
            major_code: Some(Some("NOPE".to_string())),
            ..Default::default()
        };

        let result = svc.update("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn graduation_year_in_past_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service_with(db);

        let input = UpdateProfileInput {
            graduation_year: Some(Some(2001)),
            ..Default::default()
        };

        let result = svc.update("u1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn clearing_major_skips_catalog_check() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_profile("u1")], [test_profile("u1")]])
                .into_connection(),
        );
        let svc = service_with(db);

        let input = UpdateProfileInput {
            major_code: Some(None),
            ..Default::default()
        };

        assert!(svc.update("u1", input).await.is_ok());
    }
}
