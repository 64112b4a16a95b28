use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, body::Body};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::photo::{
    LogUploadResponse, PhotoResponse, PurgeResponse, TrashListResponse, TrashedPhotoItem,
};
use crate::repo;
use crate::state::AppState;
use crate::upload::{self, UploadTarget, UploadedPhoto};
use crate::utils::filename::content_disposition_value;

#[utoipa::path(
    post,
    path = "/{id}/photos",
    tag = "Recall Photos",
    operation_id = "uploadLogPhotos",
    summary = "Upload photos to a log",
    description = "Accepts up to 8 image files per request (5MB each) as multipart fields. \
        Files that fail validation are reported in `rejected` while the rest upload; \
        a batch over the cap is refused outright.",
    params(("id" = Uuid, Path, description = "Log ID")),
    request_body(content_type = "multipart/form-data", description = "Image files to attach"),
    responses(
        (status = 201, description = "Batch processed", body = LogUploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Log not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage upload failed (UPLOAD_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(owner_id = auth_user.user_id, log_id = %id))]
pub async fn upload_log_photos(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let log = repo::logs::find_for_owner(&state.db, id, auth_user.user_id).await?;

    let files = upload::collect_multipart_files(&mut multipart).await?;
    let outcome = upload::upload_batch(
        state.recall_store.as_ref(),
        &state.db,
        UploadTarget::RecallLog {
            case_id: log.case_id,
            log_id: log.id,
            owner_id: auth_user.user_id,
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
            UploadedPhoto::Recall(m) => Some(PhotoResponse::from(m)),
            UploadedPhoto::Showing(_) => None,
        })
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(LogUploadResponse {
            uploaded,
            rejected: outcome.rejected,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/download",
    tag = "Recall Photos",
    operation_id = "downloadPhoto",
    summary = "Download a photo",
    description = "Returns the stored bytes with an attachment disposition under the original filename.",
    params(("id" = Uuid, Path, description = "Photo ID")),
    responses(
        (status = 200, description = "Photo content"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage read failed (DOWNLOAD_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn download_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let photo = repo::photos::find_for_owner(&state.db, id, auth_user.user_id).await?;
    if photo.storage_path.is_empty() {
        // Orphaned row: nothing in storage to serve.
        return Err(AppError::NotFound("Photo not found".into()));
    }

    let filename = photo.original_filename.as_deref().unwrap_or("photo.jpg");
    let bytes = state
        .recall_store
        .download(&photo.storage_path)
        .await
        .map_err(|e| AppError::Download(format!("Download failed for {filename}: {e}")))?;

    let content_type = mime_guess::from_path(&photo.storage_path).first_or_octet_stream();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, bytes.len().to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(filename),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Recall Photos",
    operation_id = "deletePhoto",
    summary = "Delete a photo permanently",
    description = "Removes the blob from storage, then the row. Any staged trash entry for the photo is dropped. There is no undo.",
    params(("id" = Uuid, Path, description = "Photo ID")),
    responses(
        (status = 204, description = "Photo deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage delete failed (DELETE_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn delete_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let photo = repo::photos::find_for_owner(&state.db, id, auth_user.user_id).await?;

    if !photo.storage_path.is_empty() {
        state
            .recall_store
            .remove(&photo.storage_path)
            .await
            .map_err(|e| AppError::Delete(format!("Failed to delete photo from storage: {e}")))?;
    }

    repo::photos::delete_row(&state.db, photo.id).await?;
    state.photo_trash.discard(auth_user.user_id, photo.id);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/trash",
    tag = "Recall Photos",
    operation_id = "trashPhoto",
    summary = "Stage a photo in the trash",
    description = "The photo disappears from log views but its row and blob stay put. \
        The staging lives in process memory: a restart clears it and the photo resurfaces.",
    params(("id" = Uuid, Path, description = "Photo ID")),
    responses(
        (status = 204, description = "Photo staged"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Photo not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn trash_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let photo = repo::photos::find_for_owner(&state.db, id, auth_user.user_id).await?;
    state.photo_trash.stage(auth_user.user_id, photo);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/restore",
    tag = "Recall Photos",
    operation_id = "restorePhoto",
    summary = "Restore a photo from the trash",
    params(("id" = Uuid, Path, description = "Photo ID")),
    responses(
        (status = 200, description = "Photo restored", body = PhotoResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Photo not staged (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn restore_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PhotoResponse>, AppError> {
    let staged = state
        .photo_trash
        .restore(auth_user.user_id, id)
        .ok_or_else(|| AppError::NotFound("Photo not found".into()))?;

    Ok(Json(PhotoResponse::from(staged.photo)))
}

#[utoipa::path(
    get,
    path = "/{id}/trash",
    tag = "Recall Photos",
    operation_id = "listLogTrash",
    summary = "List a log's trashed photos",
    params(("id" = Uuid, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Staged photos", body = TrashListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Log not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, log_id = %id))]
pub async fn list_log_trash(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TrashListResponse>, AppError> {
    let log = repo::logs::find_for_owner(&state.db, id, auth_user.user_id).await?;

    let photos = state
        .photo_trash
        .list_for_log(auth_user.user_id, log.id)
        .iter()
        .map(TrashedPhotoItem::from)
        .collect();

    Ok(Json(TrashListResponse { photos }))
}

#[utoipa::path(
    delete,
    path = "/{id}/trash",
    tag = "Recall Photos",
    operation_id = "emptyLogTrash",
    summary = "Empty a log's trash",
    description = "Permanently deletes every photo staged for the log: blobs first, then rows. Returns how many went away.",
    params(("id" = Uuid, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Trash emptied", body = PurgeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Log not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage delete failed (DELETE_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, log_id = %id))]
pub async fn empty_log_trash(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurgeResponse>, AppError> {
    let log = repo::logs::find_for_owner(&state.db, id, auth_user.user_id).await?;

    let mut purged = 0;
    for staged in state.photo_trash.take_for_log(auth_user.user_id, log.id) {
        if !staged.photo.storage_path.is_empty() {
            state
                .recall_store
                .remove(&staged.photo.storage_path)
                .await
                .map_err(|e| {
                    AppError::Delete(format!("Failed to delete photo from storage: {e}"))
                })?;
        }
        repo::photos::delete_row(&state.db, staged.photo.id).await?;
        purged += 1;
    }

    Ok(Json(PurgeResponse { purged }))
}

#[utoipa::path(
    post,
    path = "/{id}/photos/cleanup",
    tag = "Recall Photos",
    operation_id = "cleanupLogPhotos",
    summary = "Purge a log's orphaned photo rows",
    description = "Deletes rows that have no stored blob, typically left behind by an interrupted upload.",
    params(("id" = Uuid, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Orphaned rows purged", body = PurgeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Log not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, log_id = %id))]
pub async fn cleanup_photos(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurgeResponse>, AppError> {
    let log = repo::logs::find_for_owner(&state.db, id, auth_user.user_id).await?;
    let purged = repo::photos::cleanup_orphaned(&state.db, log.id, auth_user.user_id).await?;
    Ok(Json(PurgeResponse { purged }))
}

/// Body limit layer for the log photo upload route (48MB).
pub fn recall_upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(48 * 1024 * 1024)
}
