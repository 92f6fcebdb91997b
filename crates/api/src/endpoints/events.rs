//! Event endpoints.

use axum::{Json, Router, extract::State, routing::post};
use campus_common::{AppError, AppResult};
use campus_core::{CreateEventInput, UpdateEventInput};
use campus_db::entities::event;
use campus_db::entities::event_rsvp::RsvpStatus;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Event response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub capacity: Option<i32>,
    pub cover_image_url: Option<String>,
    pub created_by: Option<String>,
    pub club_code: Option<String>,
    pub is_campus_wide: bool,
    pub is_published: bool,
    pub publish_at: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience_club_codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub going_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interested_count: Option<u64>,
}

impl From<event::Model> for EventResponse {
    fn from(e: event::Model) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            location: e.location,
            start_time: e.start_time.to_rfc3339(),
            end_time: e.end_time.map(|t| t.to_rfc3339()),
            capacity: e.capacity,
            cover_image_url: e.cover_image_url,
            created_by: e.created_by,
            club_code: e.club_code,
            is_campus_wide: e.is_campus_wide,
            is_published: e.is_published,
            publish_at: e.publish_at.map(|t| t.to_rfc3339()),
            created_at: e.created_at.to_rfc3339(),
            audience_club_codes: None,
            going_count: None,
            interested_count: None,
        }
    }
}

/// Show event request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowEventRequest {
    pub event_id: String,
}

/// Delete event request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventRequest {
    pub event_id: String,
}

/// Publish/unpublish request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEventRequest {
    pub event_id: String,
}

/// RSVP request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRequest {
    pub event_id: String,
    /// One of `going`, `interested`, `not_going`.
    pub status: String,
}

/// RSVP response with fresh tallies.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResponse {
    pub event_id: String,
    pub status: String,
    pub going_count: u64,
    pub interested_count: u64,
}

/// List events request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Club events request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubEventsRequest {
    pub club_code: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

// ==================== Handlers ====================

/// Create a new event.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEventInput>,
) -> AppResult<ApiResponse<EventResponse>> {
    let actor = state.event_service.actor_for(&user).await?;
    let event = state.event_service.create(&actor, input).await?;

    let mut response: EventResponse = event.into();
    response.audience_club_codes =
        Some(state.event_service.audience_codes(&response.id).await?);

    Ok(ApiResponse::ok(response))
}

/// Update an event.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateEventInput>,
) -> AppResult<ApiResponse<EventResponse>> {
    let actor = state.event_service.actor_for(&user).await?;
    let event = state.event_service.update(&actor, input).await?;

    let mut response: EventResponse = event.into();
    response.audience_club_codes =
        Some(state.event_service.audience_codes(&response.id).await?);

    Ok(ApiResponse::ok(response))
}

/// Delete an event.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteEventRequest>,
) -> AppResult<ApiResponse<()>> {
    let actor = state.event_service.actor_for(&user).await?;
    state.event_service.delete(&actor, &req.event_id).await?;

    Ok(ApiResponse::ok(()))
}

/// Show an event.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let actor = state.event_service.actor_for(&user).await?;
    let event = state.event_service.get_for_viewer(&actor, &req.event_id).await?;

    let mut response: EventResponse = event.into();
    response.audience_club_codes =
        Some(state.event_service.audience_codes(&response.id).await?);

    let counts = state.event_service.rsvp_counts(&response.id).await?;
    response.going_count = Some(counts.going);
    response.interested_count = Some(counts.interested);

    Ok(ApiResponse::ok(response))
}

/// Publish an event immediately.
async fn publish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PublishEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let actor = state.event_service.actor_for(&user).await?;
    let event = state.event_service.publish(&actor, &req.event_id).await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Revert an event to draft.
async fn unpublish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PublishEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    let actor = state.event_service.actor_for(&user).await?;
    let event = state.event_service.unpublish(&actor, &req.event_id).await?;

    Ok(ApiResponse::ok(event.into()))
}

/// Set the caller's RSVP for an event.
async fn rsvp(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RsvpRequest>,
) -> AppResult<ApiResponse<RsvpResponse>> {
    let status: RsvpStatus = req
        .status
        .parse()
        .map_err(|()| AppError::Validation(format!("Unknown RSVP status: {}", req.status)))?;

    let actor = state.event_service.actor_for(&user).await?;
    let saved = state.event_service.rsvp(&actor, &req.event_id, status).await?;
    let counts = state.event_service.rsvp_counts(&req.event_id).await?;

    Ok(ApiResponse::ok(RsvpResponse {
        event_id: saved.event_id,
        status: saved.status.as_str().to_string(),
        going_count: counts.going,
        interested_count: counts.interested,
    }))
}

/// Campus-wide events.
async fn campus_wide(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListEventsRequest>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let limit = req.limit.min(100);
    let events = state.event_service.list_campus_wide(limit, req.offset).await?;

    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

/// Events on a club's listing. Officers of the club see drafts.
async fn for_club(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ClubEventsRequest>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let limit = req.limit.min(100);
    let actor = state.event_service.actor_for(&user).await?;
    let events = state
        .event_service
        .list_for_club(&actor, &req.club_code, limit, req.offset)
        .await?;

    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

/// Upcoming events across campus.
async fn upcoming(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListEventsRequest>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let limit = req.limit.min(100);
    let events = state.event_service.list_upcoming(limit, req.offset).await?;

    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

/// Every event including drafts. Admins only.
async fn all(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListEventsRequest>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let limit = req.limit.min(100);
    let actor = state.event_service.actor_for(&user).await?;
    let events = state.event_service.list_all(&actor, limit, req.offset).await?;

    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/publish", post(publish))
        .route("/unpublish", post(unpublish))
        .route("/rsvp", post(rsvp))
        .route("/campus", post(campus_wide))
        .route("/for-club", post(for_club))
        .route("/upcoming", post(upcoming))
        .route("/all", post(all))
}
