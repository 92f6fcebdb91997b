//! Major repository.

use std::sync::Arc;

use campus_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Order, QueryOrder};

use crate::entities::{Major, major};

/// Repository for major lookups.
#[derive(Clone)]
pub struct MajorRepository {
    db: Arc<DatabaseConnection>,
}

impl MajorRepository {
    /// Create a new major repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find major by code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<major::Model>> {
        Major::find_by_id(code)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all majors ordered by name.
    pub async fn list(&self) -> AppResult<Vec<major::Model>> {
        Major::find()
            .order_by(major::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a major.
    pub async fn create(&self, model: major::ActiveModel) -> AppResult<major::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
