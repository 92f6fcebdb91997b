//! Account service.
//!
//! Signup, signin, and signout with argon2 password hashing and opaque
//! bearer tokens stored on the user row.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use campus_common::{AppError, AppResult, id::IdGenerator};
use campus_db::entities::{profile, user};
use campus_db::repositories::{ProfileRepository, UserRepository};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

/// Input for creating an account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpInput {
    #[validate(length(min = 3, max = 64), custom(function = validate_username))]
    pub username: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 128))]
    pub full_name: Option<String>,
}

/// Input for signing in.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInInput {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), validator::ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("username"))
    }
}

/// Service for account lifecycle.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    profile_repo: ProfileRepository,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, profile_repo: ProfileRepository) -> Self {
        Self {
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an account with an empty profile and issue a token.
    pub async fn sign_up(&self, input: SignUpInput) -> AppResult<user::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        if let Some(ref email) = input.email {
            if self.user_repo.find_by_email(email).await?.is_some() {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }

        let id = self.id_gen.generate();
        let token = self.id_gen.generate_token();
        let now = Utc::now();

        let model = user::ActiveModel {
            id: Set(id.clone()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            email: Set(input.email),
            password_hash: Set(hash_password(&input.password)?),
            token: Set(Some(token)),
            is_admin: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;

        let profile = profile::ActiveModel {
            user_id: Set(user.id.clone()),
            full_name: Set(input.full_name),
            avatar_url: Set(None),
            major_code: Set(None),
            graduation_year: Set(None),
            club_codes: Set(json!([])),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };
        self.profile_repo.create(profile).await?;

        info!(user_id = %user.id, "Account created");

        Ok(user)
    }

    /// Verify credentials and rotate the bearer token.
    pub async fn sign_in(&self, input: SignInInput) -> AppResult<user::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        self.user_repo.set_token(&user.id, &token).await
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Invalidate the user's token.
    pub async fn sign_out(&self, user: &user::Model) -> AppResult<()> {
        let mut active: user::ActiveModel = user.clone().into();
        active.token = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await?;

        Ok(())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> AccountService {
        AccountService::new(UserRepository::new(db.clone()), ProfileRepository::new(db))
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(verify_password("test_password_123", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service_with(db);

        let input = SignUpInput {
            username: "alice".to_string(),
            email: None,
            password: "short".to_string(),
            full_name: None,
        };

        let result = svc.sign_up(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn invalid_username_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = service_with(db);

        let input = SignUpInput {
            username: "not a name".to_string(),
            email: None,
            password: "long_enough_password".to_string(),
            full_name: None,
        };

        let result = svc.sign_up(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn sign_in_unknown_user_is_unauthorized() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let svc = service_with(db);

        let input = SignInInput {
            username: "ghost".to_string(),
            password: "whatever_password".to_string(),
        };

        let result = svc.sign_in(input).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
