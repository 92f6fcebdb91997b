//! Event service.
//!
//! Creation, editing, publish state, and audience management for
//! campus events. Visibility for ordinary viewers is derived from the
//! stored row at read time; see [`crate::services::visibility`].

use chrono::{DateTime, Utc};
use campus_common::{AppError, AppResult, id::IdGenerator};
use campus_db::entities::{event, event_rsvp, event_rsvp::RsvpStatus, user};
use campus_db::repositories::{ClubRepository, EventRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::services::audience::{AudienceSelection, AudienceSpec, resolve_audience};
use crate::services::permission::{
    Actor, EventContext, can_delete_event, can_edit_event, can_publish_event,
};
use crate::services::visibility::{filter_visible, is_visible_to_public};

/// Input for creating an event.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 8192))]
    pub description: Option<String>,
    #[validate(length(max = 256))]
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub cover_image_url: Option<String>,
    /// Owning club; absent for school-wide events.
    pub club_code: Option<String>,
    #[serde(default)]
    pub is_campus_wide: bool,
    /// Additional club listings beyond the owning club.
    #[serde(default)]
    pub audience_club_codes: Vec<String>,
    /// Scheduled publish time; must be in the future.
    pub publish_at: Option<DateTime<Utc>>,
}

/// Input for updating an event.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    pub event_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(max = 8192))]
    pub description: Option<Option<String>>,
    #[validate(length(max = 256))]
    pub location: Option<Option<String>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
    #[validate(range(min = 1))]
    pub capacity: Option<Option<i32>>,
    pub cover_image_url: Option<Option<String>>,
    pub is_campus_wide: Option<bool>,
    pub audience_club_codes: Option<Vec<String>>,
    pub publish_at: Option<Option<DateTime<Utc>>>,
}

/// Attendance tallies derived from RSVP rows.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpCounts {
    pub going: u64,
    pub interested: u64,
}

/// Service for managing events.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    club_repo: ClubRepository,
    id_gen: IdGenerator,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub const fn new(event_repo: EventRepository, club_repo: ClubRepository) -> Self {
        Self {
            event_repo,
            club_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Build the permission actor for a user.
    pub async fn actor_for(&self, user: &user::Model) -> AppResult<Actor> {
        let officer_clubs = self.club_repo.officer_club_codes(&user.id).await?;

        Ok(Actor {
            id: user.id.clone(),
            is_admin: user.is_admin,
            officer_clubs,
        })
    }

    /// Get an event for a viewer, hiding unpublished drafts.
    ///
    /// Actors who may edit the event see it in any state; everyone else
    /// gets not-found until the event is visible.
    pub async fn get_for_viewer(&self, actor: &Actor, id: &str) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(id).await?;

        if can_edit_event(actor, &EventContext::from_event(&event))
            || is_visible_to_public(&event, Utc::now())
        {
            return Ok(event);
        }

        Err(AppError::EventNotFound(id.to_string()))
    }

    /// List campus-wide events visible to ordinary viewers.
    pub async fn list_campus_wide(&self, limit: u64, offset: u64) -> AppResult<Vec<event::Model>> {
        let events = self.event_repo.find_campus_wide(limit, offset).await?;
        Ok(filter_visible(events, Utc::now()))
    }

    /// List a club's events.
    ///
    /// Site admins and officers of the club see drafts too; everyone
    /// else only events already visible.
    pub async fn list_for_club(
        &self,
        actor: &Actor,
        club_code: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<event::Model>> {
        self.club_repo.get_by_code(club_code).await?;

        let events = self.event_repo.find_for_club(club_code, limit, offset).await?;

        if actor.is_admin || actor.is_officer_of(club_code) {
            return Ok(events);
        }

        Ok(filter_visible(events, Utc::now()))
    }

    /// List upcoming events visible to ordinary viewers, soonest first.
    pub async fn list_upcoming(&self, limit: u64, offset: u64) -> AppResult<Vec<event::Model>> {
        let now = Utc::now();
        let events = self.event_repo.find_upcoming(now, limit, offset).await?;
        Ok(filter_visible(events, now))
    }

    /// List every event including drafts. Site admins only.
    pub async fn list_all(
        &self,
        actor: &Actor,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<event::Model>> {
        if !actor.is_admin {
            return Err(AppError::Forbidden(
                "Only admins can list unpublished events".to_string(),
            ));
        }

        self.event_repo.find_all(limit, offset).await
    }

    /// Audience club codes for an event.
    pub async fn audience_codes(&self, event_id: &str) -> AppResult<Vec<String>> {
        let rows = self.event_repo.find_audiences(event_id).await?;
        Ok(rows.into_iter().map(|r| r.club_code).collect())
    }

    /// Create a new event.
    pub async fn create(&self, actor: &Actor, input: CreateEventInput) -> AppResult<event::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        validate_times(input.start_time, input.end_time)?;

        if let Some(publish_at) = input.publish_at {
            validate_publish_at(publish_at, Utc::now())?;
        }

        if !actor.is_admin && input.club_code.is_none() {
            return Err(AppError::Forbidden(
                "Only admins can create school-wide events".to_string(),
            ));
        }

        // The owning club is always part of the audience
        let mut club_codes = input.audience_club_codes;
        if let Some(ref code) = input.club_code {
            if !club_codes.contains(code) {
                club_codes.insert(0, code.clone());
            }
        }

        let spec = resolve_audience(
            actor,
            AudienceSelection {
                is_campus_wide: input.is_campus_wide,
                club_codes,
            },
        )?;

        for code in &spec.club_codes {
            self.club_repo.get_by_code(code).await?;
        }

        let id = self.id_gen.generate();
        let now = Utc::now();

        let model = event::ActiveModel {
            id: Set(id.clone()),
            title: Set(input.title),
            description: Set(input.description),
            location: Set(input.location),
            start_time: Set(input.start_time.into()),
            end_time: Set(input.end_time.map(Into::into)),
            capacity: Set(input.capacity),
            cover_image_url: Set(input.cover_image_url),
            created_by: Set(Some(actor.id.clone())),
            club_code: Set(input.club_code),
            is_campus_wide: Set(spec.is_campus_wide),
            is_published: Set(false),
            publish_at: Set(input.publish_at.map(Into::into)),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let event = self.event_repo.create(model).await?;
        self.write_audience(&event.id, &spec).await?;

        info!(event_id = %event.id, actor = %actor.id, "Event created");

        Ok(event)
    }

    /// Update an event.
    pub async fn update(&self, actor: &Actor, input: UpdateEventInput) -> AppResult<event::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let event = self.event_repo.get_by_id(&input.event_id).await?;

        if !can_edit_event(actor, &EventContext::from_event(&event)) {
            return Err(AppError::Forbidden(
                "Not allowed to edit this event".to_string(),
            ));
        }

        let start = input
            .start_time
            .unwrap_or_else(|| event.start_time.with_timezone(&Utc));
        let end = match input.end_time {
            Some(end) => end,
            None => event.end_time.map(|t| t.with_timezone(&Utc)),
        };
        validate_times(start, end)?;

        if let Some(Some(publish_at)) = input.publish_at {
            validate_publish_at(publish_at, Utc::now())?;
        }

        // Re-resolve the audience when any part of it changes
        let audience_changed = input.is_campus_wide.is_some() || input.audience_club_codes.is_some();
        let spec = if audience_changed {
            let is_campus_wide = input.is_campus_wide.unwrap_or(event.is_campus_wide);
            let mut club_codes = match input.audience_club_codes {
                Some(codes) => codes,
                None => self.audience_codes(&event.id).await?,
            };
            if let Some(ref code) = event.club_code {
                if !club_codes.contains(code) {
                    club_codes.insert(0, code.clone());
                }
            }

            let spec = resolve_audience(
                actor,
                AudienceSelection {
                    is_campus_wide,
                    club_codes,
                },
            )?;

            for code in &spec.club_codes {
                self.club_repo.get_by_code(code).await?;
            }

            Some(spec)
        } else {
            None
        };

        let event_id = event.id.clone();
        let mut active: event::ActiveModel = event.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(start_time) = input.start_time {
            active.start_time = Set(start_time.into());
        }
        if let Some(end_time) = input.end_time {
            active.end_time = Set(end_time.map(Into::into));
        }
        if let Some(capacity) = input.capacity {
            active.capacity = Set(capacity);
        }
        if let Some(cover_image_url) = input.cover_image_url {
            active.cover_image_url = Set(cover_image_url);
        }
        if let Some(publish_at) = input.publish_at {
            active.publish_at = Set(publish_at.map(Into::into));
        }
        if let Some(ref spec) = spec {
            active.is_campus_wide = Set(spec.is_campus_wide);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.event_repo.update(active).await?;

        if let Some(spec) = spec {
            self.event_repo.clear_audiences(&event_id).await?;
            self.write_audience(&event_id, &spec).await?;
        }

        Ok(updated)
    }

    /// Delete an event permanently.
    pub async fn delete(&self, actor: &Actor, event_id: &str) -> AppResult<()> {
        let event = self.event_repo.get_by_id(event_id).await?;

        if !can_delete_event(actor, &EventContext::from_event(&event)) {
            return Err(AppError::Forbidden(
                "Not allowed to delete this event".to_string(),
            ));
        }

        self.event_repo.delete(event_id).await?;

        info!(event_id = %event_id, actor = %actor.id, "Event deleted");

        Ok(())
    }

    /// Flip the published flag on. Site admins only.
    pub async fn publish(&self, actor: &Actor, event_id: &str) -> AppResult<event::Model> {
        if !can_publish_event(actor) {
            return Err(AppError::Forbidden(
                "Only admins can publish events".to_string(),
            ));
        }

        let event = self.event_repo.get_by_id(event_id).await?;
        let mut active: event::ActiveModel = event.into();
        active.is_published = Set(true);
        active.updated_at = Set(Some(Utc::now().into()));

        self.event_repo.update(active).await
    }

    /// Flip the published flag off. Site admins only.
    ///
    /// An event with a past `publish_at` stays visible regardless;
    /// callers wanting to fully hide it must clear the schedule too.
    pub async fn unpublish(&self, actor: &Actor, event_id: &str) -> AppResult<event::Model> {
        if !can_publish_event(actor) {
            return Err(AppError::Forbidden(
                "Only admins can unpublish events".to_string(),
            ));
        }

        let event = self.event_repo.get_by_id(event_id).await?;
        let mut active: event::ActiveModel = event.into();
        active.is_published = Set(false);
        active.updated_at = Set(Some(Utc::now().into()));

        self.event_repo.update(active).await
    }

    // ==================== RSVPs ====================

    /// Set the caller's RSVP on an event.
    ///
    /// The event must be visible to the caller; answering again
    /// overwrites the previous answer.
    pub async fn rsvp(
        &self,
        actor: &Actor,
        event_id: &str,
        status: RsvpStatus,
    ) -> AppResult<event_rsvp::Model> {
        self.get_for_viewer(actor, event_id).await?;

        self.event_repo
            .set_rsvp(
                self.id_gen.generate(),
                event_id.to_string(),
                actor.id.clone(),
                status,
            )
            .await
    }

    /// Attendance tallies for an event.
    pub async fn rsvp_counts(&self, event_id: &str) -> AppResult<RsvpCounts> {
        Ok(RsvpCounts {
            going: self.event_repo.count_rsvps(event_id, RsvpStatus::Going).await?,
            interested: self
                .event_repo
                .count_rsvps(event_id, RsvpStatus::Interested)
                .await?,
        })
    }

    async fn write_audience(&self, event_id: &str, spec: &AudienceSpec) -> AppResult<()> {
        for code in &spec.club_codes {
            self.event_repo
                .add_audience(self.id_gen.generate(), event_id.to_string(), code.clone())
                .await?;
        }
        Ok(())
    }
}

fn validate_times(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> AppResult<()> {
    if let Some(end) = end {
        if end < start {
            return Err(AppError::Validation(
                "Event must end at or after it starts".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_publish_at(publish_at: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if publish_at <= now {
        return Err(AppError::Validation(
            "Scheduled publish time must be in the future".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service() -> EventService {
        // Mock connection; tests below fail before any query runs
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        EventService::new(EventRepository::new(db.clone()), ClubRepository::new(db))
    }

    fn actor(is_admin: bool, officer_clubs: &[&str]) -> Actor {
        Actor {
            id: "u1".to_string(),
            is_admin,
            officer_clubs: officer_clubs.iter().map(ToString::to_string).collect(),
        }
    }

    fn base_input() -> CreateEventInput {
        CreateEventInput {
            title: "Hack Night".to_string(),
            description: None,
            location: None,
            start_time: Utc::now() + Duration::days(7),
            end_time: None,
            capacity: None,
            cover_image_url: None,
            club_code: Some("ACM".to_string()),
            is_campus_wide: false,
            audience_club_codes: vec![],
            publish_at: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_end_before_start() {
        let svc = service();
        let mut input = base_input();
        input.end_time = Some(input.start_time - Duration::hours(1));

        let result = svc.create(&actor(false, &["ACM"]), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_rejects_past_publish_at() {
        let svc = service();
        let mut input = base_input();
        input.publish_at = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

        let result = svc.create(&actor(false, &["ACM"]), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn non_admin_cannot_create_school_wide_event() {
        let svc = service();
        let mut input = base_input();
        input.club_code = None;
        input.is_campus_wide = true;

        let result = svc.create(&actor(false, &["ACM"]), input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn non_officer_cannot_create_club_event() {
        let svc = service();
        let input = base_input();

        let result = svc.create(&actor(false, &["SWE"]), input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn empty_title_rejected() {
        let svc = service();
        let mut input = base_input();
        input.title = String::new();

        let result = svc.create(&actor(true, &[]), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_times_allows_equal_start_end() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert!(validate_times(t, Some(t)).is_ok());
    }

    #[tokio::test]
    async fn update_rejects_zero_capacity() {
        let svc = service();
        let input = UpdateEventInput {
            event_id: "e1".to_string(),
            capacity: Some(Some(0)),
            ..Default::default()
        };

        let result = svc.update(&actor(true, &[]), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    fn test_club(code: &str) -> campus_db::entities::club::Model {
        campus_db::entities::club::Model {
            code: code.to_string(),
            name: format!("{code} Chapter"),
            description: None,
            cover_image_url: None,
            is_active: true,
            members_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn draft_event(id: &str, club_code: &str) -> event::Model {
        event::Model {
            id: id.to_string(),
            title: "Hack Night".to_string(),
            description: None,
            location: None,
            start_time: (Utc::now() + Duration::days(7)).into(),
            end_time: None,
            capacity: None,
            cover_image_url: None,
            created_by: Some("u9".to_string()),
            club_code: Some(club_code.to_string()),
            is_campus_wide: false,
            is_published: false,
            publish_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn audience_row(event_id: &str, club_code: &str) -> campus_db::entities::event_audience::Model {
        campus_db::entities::event_audience::Model {
            id: "a1".to_string(),
            event_id: event_id.to_string(),
            club_code: club_code.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with_club_listing(
        club_code: &str,
        events: Vec<event::Model>,
    ) -> EventService {
        let audiences: Vec<_> = events
            .iter()
            .map(|e| audience_row(&e.id, club_code))
            .collect();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_club(club_code)]])
                .append_query_results([audiences])
                .append_query_results([events])
                .into_connection(),
        );
        EventService::new(EventRepository::new(db.clone()), ClubRepository::new(db))
    }

    #[tokio::test]
    async fn club_officer_sees_drafts_in_club_listing() {
        let svc = service_with_club_listing("ACM", vec![draft_event("e1", "ACM")]);

        let events = svc
            .list_for_club(&actor(false, &["ACM"]), "ACM", 10, 0)
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert!(!events[0].is_published);
    }

    #[tokio::test]
    async fn outsider_does_not_see_drafts_in_club_listing() {
        let svc = service_with_club_listing("ACM", vec![draft_event("e1", "ACM")]);

        let events = svc
            .list_for_club(&actor(false, &[]), "ACM", 10, 0)
            .await
            .unwrap();

        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn rsvp_on_hidden_draft_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft_event("e1", "ACM")]])
                .into_connection(),
        );
        let svc = EventService::new(EventRepository::new(db.clone()), ClubRepository::new(db));

        let result = svc.rsvp(&actor(false, &[]), "e1", RsvpStatus::Going).await;
        assert!(matches!(result, Err(AppError::EventNotFound(_))));
    }
}
