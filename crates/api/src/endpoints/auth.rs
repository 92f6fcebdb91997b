//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use campus_common::AppResult;
use campus_core::{SignInInput, SignUpInput};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Account response with the bearer token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub token: String,
}

/// Create a new account.
async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignUpInput>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let user = state.account_service.sign_up(input).await?;

    Ok(ApiResponse::ok(TokenResponse {
        id: user.id.clone(),
        username: user.username,
        is_admin: user.is_admin,
        token: user.token.unwrap_or_default(),
    }))
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    Json(input): Json<SignInInput>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let user = state.account_service.sign_in(input).await?;

    Ok(ApiResponse::ok(TokenResponse {
        id: user.id.clone(),
        username: user.username,
        is_admin: user.is_admin,
        token: user.token.unwrap_or_default(),
    }))
}

/// Signout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignoutResponse {
    pub ok: bool,
}

/// Invalidate the current token.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SignoutResponse>> {
    state.account_service.sign_out(&user).await?;

    Ok(ApiResponse::ok(SignoutResponse { ok: true }))
}

/// Current user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: &'static str,
    pub created_at: String,
}

/// Show the authenticated user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<MeResponse> {
    ApiResponse::ok(MeResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role(),
        created_at: user.created_at.to_rfc3339(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/i", post(me))
}
