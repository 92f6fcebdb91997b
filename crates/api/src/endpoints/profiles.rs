//! Profile endpoints.

use axum::{Json, Router, extract::State, routing::post};
use campus_common::AppResult;
use campus_core::UpdateProfileInput;
use campus_db::entities::{major, profile};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub major_code: Option<String>,
    pub graduation_year: Option<i32>,
    pub club_codes: Vec<String>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(p: profile::Model) -> Self {
        let club_codes = p.club_codes_vec();
        Self {
            user_id: p.user_id,
            full_name: p.full_name,
            avatar_url: p.avatar_url,
            major_code: p.major_code,
            graduation_year: p.graduation_year,
            club_codes,
        }
    }
}

/// Major response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorResponse {
    pub code: String,
    pub name: String,
}

impl From<major::Model> for MajorResponse {
    fn from(m: major::Model) -> Self {
        Self {
            code: m.code,
            name: m.name,
        }
    }
}

/// Show profile request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowProfileRequest {
    pub user_id: String,
}

// ==================== Handlers ====================

/// The caller's profile.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.get(&user.id).await?;

    Ok(ApiResponse::ok(profile.into()))
}

/// Update the caller's profile.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.update(&user.id, input).await?;

    Ok(ApiResponse::ok(profile.into()))
}

/// Show another user's profile.
async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowProfileRequest>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.profile_service.get(&req.user_id).await?;

    Ok(ApiResponse::ok(profile.into()))
}

/// The majors catalog.
async fn majors(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<MajorResponse>>> {
    let majors = state.profile_service.list_majors().await?;

    Ok(ApiResponse::ok(majors.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", post(me))
        .route("/update", post(update))
        .route("/show", post(show))
        .route("/majors", post(majors))
}
