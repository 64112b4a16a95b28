use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::log::{
    CaseHeader, CreateLogRequest, LogDetailResponse, LogPhotoItem, LogResponse, LogSearchItem,
    LogSearchQuery, UpdateLogRequest, validate_log_type, validate_note,
};
use crate::repo;
use crate::repo::logs::LogSearchFilters;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/logs",
    tag = "Recall Logs",
    operation_id = "createLog",
    summary = "Add a log to a case",
    description = "The log type must be one of the configured compose types. The note may be blank when photos carry the content.",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = CreateLogRequest,
    responses(
        (status = 201, description = "Log created", body = LogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Case not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(owner_id = auth_user.user_id, case_id = %id))]
pub async fn create_log(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateLogRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_log_type(&payload.log_type, &state.config.recall.compose_log_types)?;
    validate_note(&payload.note)?;

    let case = repo::cases::find_active_for_owner(&state.db, id, auth_user.user_id).await?;
    let log = repo::logs::create(
        &state.db,
        case.id,
        auth_user.user_id,
        payload.log_type,
        payload.note.trim().to_string(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(LogResponse::from(log))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Recall Logs",
    operation_id = "getLog",
    summary = "Get a log with its photos",
    description = "Returns the log, its case header, and active photos oldest first with 10-minute viewing URLs. Photos staged in the trash are hidden; `orphaned_count` reports rows left behind without a blob.",
    params(("id" = Uuid, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Log detail", body = LogDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Log not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn get_log(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LogDetailResponse>, AppError> {
    let log = repo::logs::find_for_owner(&state.db, id, auth_user.user_id).await?;
    let case = repo::cases::find_any_for_owner(&state.db, log.case_id, auth_user.user_id).await?;

    let photos: Vec<_> = repo::photos::for_log(&state.db, log.id)
        .await?
        .into_iter()
        .filter(|p| !state.photo_trash.is_staged(auth_user.user_id, p.id))
        .collect();
    let orphaned_count = repo::photos::orphaned_for_log(&state.db, log.id).await?.len() as i64;

    let paths: Vec<String> = photos.iter().map(|p| p.storage_path.clone()).collect();
    let ttl = state.recall_store.policy().url_ttl_secs;
    let mut urls = state.recall_store.signed_urls(&paths, ttl).await;

    let photos = photos
        .into_iter()
        .map(|p| LogPhotoItem {
            url: urls.remove(&p.storage_path),
            id: p.id,
            original_filename: p.original_filename,
            created_at: p.created_at,
        })
        .collect();

    Ok(Json(LogDetailResponse {
        id: log.id,
        case_id: log.case_id,
        log_type: log.log_type,
        note: log.note,
        created_at: log.created_at,
        updated_at: log.updated_at,
        case: CaseHeader {
            title: case.title,
            client_name: case.client_name,
        },
        photos,
        orphaned_count,
    }))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Recall Logs",
    operation_id = "updateLog",
    summary = "Update a log",
    description = "PATCH semantics: omitted fields are left unchanged. The log type must be one of the configured edit types, which differ from the compose types.",
    params(("id" = Uuid, Path, description = "Log ID")),
    request_body = UpdateLogRequest,
    responses(
        (status = 200, description = "Log updated", body = LogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Log not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn update_log(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateLogRequest>,
) -> Result<Json<LogResponse>, AppError> {
    if let Some(log_type) = payload.log_type.as_deref() {
        validate_log_type(log_type, &state.config.recall.edit_log_types)?;
    }
    if let Some(note) = payload.note.as_deref() {
        validate_note(note)?;
    }

    let log = repo::logs::find_for_owner(&state.db, id, auth_user.user_id).await?;
    let log = repo::logs::update(
        &state.db,
        log,
        payload.log_type,
        payload.note.map(|n| n.trim().to_string()),
    )
    .await?;

    Ok(Json(LogResponse::from(log)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Recall Logs",
    operation_id = "deleteLog",
    summary = "Delete a log permanently",
    description = "Hard delete: removes the log's blobs from storage, then the log and all its photo rows. Staged trash entries for the log are dropped. There is no undo.",
    params(("id" = Uuid, Path, description = "Log ID")),
    responses(
        (status = 204, description = "Log deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Log not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage delete failed (DELETE_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn delete_log(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let log = repo::logs::find_for_owner(&state.db, id, auth_user.user_id).await?;

    let paths: Vec<String> = repo::photos::for_log(&state.db, log.id)
        .await?
        .into_iter()
        .map(|p| p.storage_path)
        .collect();
    if !paths.is_empty() {
        state
            .recall_store
            .remove_many(&paths)
            .await
            .map_err(|e| AppError::Delete(format!("Failed to delete photos from storage: {e}")))?;
    }

    let log_id = log.id;
    repo::logs::hard_delete(&state.db, log).await?;
    state.photo_trash.take_for_log(auth_user.user_id, log_id);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Recall Logs",
    operation_id = "searchLogs",
    summary = "Search logs",
    description = "Case-insensitive substring search over notes, optionally narrowed to one case or one log type. Logs whose case sits in the trash are excluded. Newest first (cap 100).",
    params(LogSearchQuery),
    responses(
        (status = 200, description = "Search hits", body = Vec<LogSearchItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(owner_id = auth_user.user_id))]
pub async fn search_logs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LogSearchQuery>,
) -> Result<Json<Vec<LogSearchItem>>, AppError> {
    let filters = LogSearchFilters {
        q: query.q,
        case_id: query.case_id,
        log_type: query.log_type,
    };
    let hits = repo::logs::search(&state.db, auth_user.user_id, filters).await?;

    let items = hits
        .into_iter()
        .map(|hit| LogSearchItem {
            id: hit.log.id,
            case_id: hit.log.case_id,
            log_type: hit.log.log_type,
            note: hit.log.note,
            created_at: hit.log.created_at,
            updated_at: hit.log.updated_at,
            case: CaseHeader {
                title: hit.case_title,
                client_name: hit.case_client_name,
            },
            photo_count: hit.photo_count,
        })
        .collect();

    Ok(Json(items))
}
