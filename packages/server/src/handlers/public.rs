//! Buyer-facing endpoints under `/r/{token}`. The public token is the only
//! credential; nothing here reads the `Authorization` header.

use axum::{
    Json,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::showing::{
    FeedbackRequest, ShowingPhotoResponse, ShowingResponse, ShowingUploadResponse,
    validate_feedback,
};
use crate::repo;
use crate::state::AppState;
use crate::upload::{self, UploadTarget, UploadedPhoto};

#[utoipa::path(
    get,
    path = "/{token}",
    tag = "Public Feedback",
    operation_id = "getPublicShowing",
    summary = "Load a showing by its public token",
    params(("token" = Uuid, Path, description = "Public showing token")),
    responses(
        (status = 200, description = "Showing", body = ShowingResponse),
        (status = 404, description = "Unknown token (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(token = %token))]
pub async fn get_public_showing(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<Json<ShowingResponse>, AppError> {
    let showing = repo::showings::find_by_token(&state.db, token).await?;
    Ok(Json(ShowingResponse::from(showing)))
}

#[utoipa::path(
    post,
    path = "/{token}/feedback",
    tag = "Public Feedback",
    operation_id = "submitFeedback",
    summary = "Submit buyer feedback",
    description = "One atomic token-keyed update; resubmission overwrites the previous feedback in place.",
    params(("token" = Uuid, Path, description = "Public showing token")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback recorded", body = ShowingResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown token (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(token = %token))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    AppJson(payload): AppJson<FeedbackRequest>,
) -> Result<Json<ShowingResponse>, AppError> {
    let feedback = validate_feedback(&payload)?;

    let updated =
        repo::showings::submit_feedback(&state.db, token, feedback.status, feedback.note).await?;
    if !updated {
        return Err(AppError::NotFound("Invalid showing link".into()));
    }

    let showing = repo::showings::find_by_token(&state.db, token).await?;
    Ok(Json(ShowingResponse::from(showing)))
}

#[utoipa::path(
    post,
    path = "/{token}/photos",
    tag = "Public Feedback",
    operation_id = "uploadShowingPhotos",
    summary = "Upload buyer photos for a showing",
    description = "Multipart batch upload. Each file must be JPEG or PNG and at most 10MB; a showing holds at most 10 photos in total. Invalid files are rejected individually without blocking the rest. Body limit: 112 MB.",
    params(("token" = Uuid, Path, description = "Public showing token")),
    request_body(content_type = "multipart/form-data", description = "Photo files (JPG or PNG, up to 10MB each)"),
    responses(
        (status = 201, description = "Batch outcome", body = ShowingUploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Unknown token (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Blob upload failed in-flight (UPLOAD_FAILED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart), fields(token = %token))]
pub async fn upload_showing_photos(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let showing = repo::showings::find_by_token(&state.db, token).await?;
    let files = upload::collect_multipart_files(&mut multipart).await?;

    let outcome = upload::upload_batch(
        state.showing_store.as_ref(),
        &state.db,
        UploadTarget::Showing {
            showing_id: showing.id,
        },
        files,
        |name, milestone| {
            tracing::debug!(file = %name, progress = milestone.percent(), "Upload progress");
        },
    )
    .await?;

    let uploaded = outcome
        .uploaded
        .into_iter()
        .filter_map(|photo| match photo {
            UploadedPhoto::Showing(m) => Some(ShowingPhotoResponse::with_url(m, None)),
            UploadedPhoto::Recall(_) => None,
        })
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(ShowingUploadResponse {
            uploaded,
            rejected: outcome.rejected,
        }),
    ))
}

/// Body limit layer for the public photo upload route (112MB).
pub fn showing_upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(112 * 1024 * 1024)
}
