//! Upload endpoints for avatars and club covers.

use axum::{
    Router,
    extract::{Multipart, State},
    routing::post,
};
use campus_common::{AppError, AppResult, storage::generate_storage_key};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Allowed upload size (5 MiB).
const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Uploaded image response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

struct UploadedImage {
    data: Vec<u8>,
    file_name: String,
    content_type: String,
    club_code: Option<String>,
}

async fn read_image_field(mut multipart: Multipart) -> AppResult<UploadedImage> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut club_code: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(std::string::ToString::to_string);
                content_type = field.content_type().map(std::string::ToString::to_string);
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?
                        .to_vec(),
                );
            }
            "clubCode" => {
                club_code = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let data = file_data.ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;

    if data.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::Validation("File too large".to_string()));
    }

    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    if !content_type.starts_with("image/") {
        return Err(AppError::Validation(
            "Only image uploads are supported".to_string(),
        ));
    }

    Ok(UploadedImage {
        data,
        file_name: file_name.unwrap_or_else(|| "upload".to_string()),
        content_type,
        club_code,
    })
}

/// Upload an avatar and set it on the caller's profile.
async fn upload_avatar(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let image = read_image_field(multipart).await?;

    let key = generate_storage_key(&user.id, &image.file_name);
    let uploaded = state
        .storage
        .upload(&key, &image.data, &image.content_type)
        .await?;

    state
        .profile_service
        .set_avatar(&user.id, Some(uploaded.url.clone()))
        .await?;

    Ok(ApiResponse::ok(UploadResponse {
        url: uploaded.url,
        size: uploaded.size,
        content_type: uploaded.content_type,
    }))
}

/// Upload a club cover image. Site admins or club admins.
async fn upload_club_cover(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let image = read_image_field(multipart).await?;

    let club_code = image
        .club_code
        .ok_or_else(|| AppError::BadRequest("Missing clubCode field".to_string()))?;

    // Nothing is stored until the caller's rights are confirmed
    state.club_service.ensure_can_manage(&user, &club_code).await?;

    let key = generate_storage_key(&user.id, &image.file_name);
    let uploaded = state
        .storage
        .upload(&key, &image.data, &image.content_type)
        .await?;

    state
        .club_service
        .update(
            &user,
            campus_core::UpdateClubInput {
                code: club_code,
                cover_image_url: Some(Some(uploaded.url.clone())),
                ..Default::default()
            },
        )
        .await?;

    Ok(ApiResponse::ok(UploadResponse {
        url: uploaded.url,
        size: uploaded.size,
        content_type: uploaded.content_type,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/avatar", post(upload_avatar))
        .route("/club-cover", post(upload_club_cover))
}
