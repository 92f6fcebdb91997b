//! Event repository.
//!
//! Listing queries return rows regardless of publish state; visibility
//! for non-privileged viewers is derived in the core layer at read time.

use std::sync::Arc;

use campus_common::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{
    Event, EventAudience, EventRsvp, event, event_audience, event_rsvp,
    event_rsvp::RsvpStatus,
};

/// Repository for event operations.
#[derive(Clone)]
pub struct EventRepository {
    db: Arc<DatabaseConnection>,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Event Operations ====================

    /// Find event by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get event by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::EventNotFound(id.to_string()))
    }

    /// List all events ordered by start time.
    pub async fn find_all(&self, limit: u64, offset: u64) -> AppResult<Vec<event::Model>> {
        Event::find()
            .order_by(event::Column::StartTime, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List events appearing in the campus-wide feed.
    pub async fn find_campus_wide(&self, limit: u64, offset: u64) -> AppResult<Vec<event::Model>> {
        Event::find()
            .filter(event::Column::IsCampusWide.eq(true))
            .order_by(event::Column::StartTime, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List events targeted at a club, upcoming first.
    pub async fn find_for_club(
        &self,
        club_code: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<event::Model>> {
        let audience = EventAudience::find()
            .filter(event_audience::Column::ClubCode.eq(club_code))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let event_ids: Vec<String> = audience.into_iter().map(|a| a.event_id).collect();

        if event_ids.is_empty() {
            return Ok(vec![]);
        }

        Event::find()
            .filter(event::Column::Id.is_in(event_ids))
            .order_by(event::Column::StartTime, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List events starting at or after `from`, soonest first.
    pub async fn find_upcoming(
        &self,
        from: DateTime<Utc>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<event::Model>> {
        Event::find()
            .filter(event::Column::StartTime.gte(from))
            .order_by(event::Column::StartTime, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new event.
    pub async fn create(&self, model: event::ActiveModel) -> AppResult<event::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an event.
    pub async fn update(&self, model: event::ActiveModel) -> AppResult<event::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an event permanently.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Event::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    // ==================== Audience Operations ====================

    /// List audience rows for an event.
    pub async fn find_audiences(&self, event_id: &str) -> AppResult<Vec<event_audience::Model>> {
        EventAudience::find()
            .filter(event_audience::Column::EventId.eq(event_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Attach an event to a club listing.
    pub async fn add_audience(
        &self,
        id: String,
        event_id: String,
        club_code: String,
    ) -> AppResult<event_audience::Model> {
        let model = event_audience::ActiveModel {
            id: Set(id),
            event_id: Set(event_id),
            club_code: Set(club_code),
            created_at: Set(Utc::now().into()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove all audience rows for an event.
    pub async fn clear_audiences(&self, event_id: &str) -> AppResult<()> {
        EventAudience::delete_many()
            .filter(event_audience::Column::EventId.eq(event_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    // ==================== RSVP Operations ====================

    /// Find a user's RSVP for an event.
    pub async fn find_rsvp(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> AppResult<Option<event_rsvp::Model>> {
        EventRsvp::find()
            .filter(event_rsvp::Column::EventId.eq(event_id))
            .filter(event_rsvp::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set a user's RSVP, inserting or overwriting their row.
    ///
    /// Racing answers for the same pair settle on whichever write lands
    /// last; the unique index on (`event_id`, `user_id`) keeps the pair
    /// single-rowed.
    pub async fn set_rsvp(
        &self,
        id: String,
        event_id: String,
        user_id: String,
        status: RsvpStatus,
    ) -> AppResult<event_rsvp::Model> {
        if let Some(existing) = self.find_rsvp(&event_id, &user_id).await? {
            let mut active: event_rsvp::ActiveModel = existing.into();
            active.status = Set(status);
            active.updated_at = Set(Some(Utc::now().into()));

            return active
                .update(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()));
        }

        let model = event_rsvp::ActiveModel {
            id: Set(id),
            event_id: Set(event_id),
            user_id: Set(user_id),
            status: Set(status),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count RSVPs for an event with a given status.
    pub async fn count_rsvps(&self, event_id: &str, status: RsvpStatus) -> AppResult<u64> {
        EventRsvp::find()
            .filter(event_rsvp::Column::EventId.eq(event_id))
            .filter(event_rsvp::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_event(id: &str, title: &str) -> event::Model {
        event::Model {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            start_time: Utc::now().into(),
            end_time: None,
            capacity: None,
            cover_image_url: None,
            created_by: Some("u1".to_string()),
            club_code: Some("ACM".to_string()),
            is_campus_wide: false,
            is_published: false,
            publish_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let event = create_test_event("e1", "Hack Night");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[event.clone()]])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let result = repo.find_by_id("e1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().title, "Hack Night");
    }

    #[tokio::test]
    async fn test_find_for_club_no_audience() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<event_audience::Model>::new()])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let result = repo.find_for_club("ACM", 10, 0).await.unwrap();

        assert!(result.is_empty());
    }

    fn create_test_rsvp(id: &str, status: RsvpStatus) -> event_rsvp::Model {
        event_rsvp::Model {
            id: id.to_string(),
            event_id: "e1".to_string(),
            user_id: "u1".to_string(),
            status,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_set_rsvp_inserts_first_answer() {
        let saved = create_test_rsvp("r1", RsvpStatus::Going);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<event_rsvp::Model>::new()])
                .append_query_results([[saved]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let result = repo
            .set_rsvp(
                "r1".to_string(),
                "e1".to_string(),
                "u1".to_string(),
                RsvpStatus::Going,
            )
            .await
            .unwrap();

        assert_eq!(result.status, RsvpStatus::Going);
    }

    #[tokio::test]
    async fn test_set_rsvp_overwrites_existing_answer() {
        let existing = create_test_rsvp("r1", RsvpStatus::Interested);
        let mut updated = existing.clone();
        updated.status = RsvpStatus::NotGoing;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[updated]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let result = repo
            .set_rsvp(
                "ignored".to_string(),
                "e1".to_string(),
                "u1".to_string(),
                RsvpStatus::NotGoing,
            )
            .await
            .unwrap();

        assert_eq!(result.id, "r1");
        assert_eq!(result.status, RsvpStatus::NotGoing);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let result = repo.delete("e1").await;

        assert!(result.is_ok());
    }
}
