//! Club endpoints.

use axum::{Json, Router, extract::State, routing::post};
use campus_common::{AppError, AppResult};
use campus_core::{CreateClubInput, UpdateClubInput};
use campus_db::entities::{club, club_member};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Club response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubResponse {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub is_active: bool,
    pub members_count: i64,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_role: Option<String>,
}

impl From<club::Model> for ClubResponse {
    fn from(c: club::Model) -> Self {
        Self {
            code: c.code,
            name: c.name,
            description: c.description,
            cover_image_url: c.cover_image_url,
            is_active: c.is_active,
            members_count: c.members_count,
            created_at: c.created_at.to_rfc3339(),
            my_role: None,
        }
    }
}

/// Membership response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub club_code: String,
    pub user_id: String,
    pub role: String,
    pub joined_at: String,
}

impl From<club_member::Model> for MembershipResponse {
    fn from(m: club_member::Model) -> Self {
        Self {
            club_code: m.club_code,
            user_id: m.user_id,
            role: m.role.as_str().to_string(),
            joined_at: m.joined_at.to_rfc3339(),
        }
    }
}

/// Show club request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowClubRequest {
    pub club_code: String,
}

/// List clubs request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClubsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Search clubs request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchClubsRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Join/leave request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClubRequest {
    pub club_code: String,
}

/// List members request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersRequest {
    pub club_code: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Set member role request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    pub club_code: String,
    pub user_id: String,
    pub role: String,
}

const fn default_limit() -> u64 {
    20
}

// ==================== Handlers ====================

/// Create a new club.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateClubInput>,
) -> AppResult<ApiResponse<ClubResponse>> {
    let club = state.club_service.create(&user, input).await?;

    Ok(ApiResponse::ok(club.into()))
}

/// Update a club.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateClubInput>,
) -> AppResult<ApiResponse<ClubResponse>> {
    let club = state.club_service.update(&user, input).await?;

    Ok(ApiResponse::ok(club.into()))
}

/// Show a club with the caller's role.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowClubRequest>,
) -> AppResult<ApiResponse<ClubResponse>> {
    let club = state.club_service.get_by_code(&req.club_code).await?;

    let my_role = state
        .club_service
        .list_memberships(&user.id)
        .await?
        .into_iter()
        .find(|m| m.club_code == club.code)
        .map(|m| m.role.as_str().to_string());

    let mut response: ClubResponse = club.into();
    response.my_role = my_role;

    Ok(ApiResponse::ok(response))
}

/// List active clubs.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListClubsRequest>,
) -> AppResult<ApiResponse<Vec<ClubResponse>>> {
    let limit = req.limit.min(100);
    let clubs = state.club_service.list(limit, req.offset).await?;

    Ok(ApiResponse::ok(clubs.into_iter().map(Into::into).collect()))
}

/// Search the club directory.
async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchClubsRequest>,
) -> AppResult<ApiResponse<Vec<ClubResponse>>> {
    let limit = req.limit.min(100);
    let clubs = state.club_service.search(&req.query, limit, req.offset).await?;

    Ok(ApiResponse::ok(clubs.into_iter().map(Into::into).collect()))
}

/// Join a club.
async fn join(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<JoinClubRequest>,
) -> AppResult<ApiResponse<MembershipResponse>> {
    let member = state.club_service.join(&user, &req.club_code).await?;

    Ok(ApiResponse::ok(member.into()))
}

/// Leave a club.
async fn leave(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<JoinClubRequest>,
) -> AppResult<ApiResponse<()>> {
    state.club_service.leave(&user, &req.club_code).await?;

    Ok(ApiResponse::ok(()))
}

/// List members of a club.
async fn members(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListMembersRequest>,
) -> AppResult<ApiResponse<Vec<MembershipResponse>>> {
    let limit = req.limit.min(100);
    let members = state
        .club_service
        .list_members(&req.club_code, limit, req.offset)
        .await?;

    Ok(ApiResponse::ok(members.into_iter().map(Into::into).collect()))
}

/// The caller's memberships.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MembershipResponse>>> {
    let memberships = state.club_service.list_memberships(&user.id).await?;

    Ok(ApiResponse::ok(
        memberships.into_iter().map(Into::into).collect(),
    ))
}

/// Change a member's role.
async fn set_role(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<ApiResponse<MembershipResponse>> {
    let role = req
        .role
        .parse()
        .map_err(|()| AppError::Validation(format!("Unknown role: {}", req.role)))?;

    let member = state
        .club_service
        .set_member_role(&user, &req.club_code, &req.user_id, role)
        .await?;

    Ok(ApiResponse::ok(member.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/search", post(search))
        .route("/join", post(join))
        .route("/leave", post(leave))
        .route("/members", post(members))
        .route("/mine", post(mine))
        .route("/set-role", post(set_role))
}
