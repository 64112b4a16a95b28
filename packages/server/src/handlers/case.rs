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
use crate::models::case::{
    CaseDetailResponse, CaseListItem, CaseListQuery, CaseListResponse, CaseLogItem, CaseResponse,
    CaseSearchItem, CaseSearchQuery, CreateCaseRequest, DeletedCaseListItem, UpdateCaseRequest,
    validate_create_case, validate_update_case,
};
use crate::models::shared::trim_to_none;
use crate::repo;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Recall Cases",
    operation_id = "listCases",
    summary = "List active cases",
    description = "Returns the owner's active cases ordered by last update, each with log and photo counts. `has_more` signals another page past this one.",
    params(CaseListQuery),
    responses(
        (status = 200, description = "Page of cases", body = CaseListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(owner_id = auth_user.user_id))]
pub async fn list_cases(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CaseListQuery>,
) -> Result<Json<CaseListResponse>, AppError> {
    let limit = query.limit.unwrap_or(20);
    let offset = query.offset.unwrap_or(0);

    let (cases, has_more) =
        repo::cases::list_active(&state.db, auth_user.user_id, limit, offset).await?;

    let data = cases
        .into_iter()
        .map(|c| CaseListItem::from((c.case, c.log_count, c.photo_count)))
        .collect();

    Ok(Json(CaseListResponse { data, has_more }))
}

#[utoipa::path(
    get,
    path = "/deleted",
    tag = "Recall Cases",
    operation_id = "listDeletedCases",
    summary = "List trashed cases",
    description = "Returns the owner's soft-deleted cases, most recently deleted first (cap 50). Each can be brought back with the restore endpoint.",
    responses(
        (status = 200, description = "Trashed cases", body = Vec<DeletedCaseListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id))]
pub async fn list_deleted_cases(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<DeletedCaseListItem>>, AppError> {
    let cases = repo::cases::list_deleted(&state.db, auth_user.user_id).await?;

    let items = cases
        .into_iter()
        .map(|c| DeletedCaseListItem {
            id: c.case.id,
            title: c.case.title,
            client_name: c.case.client_name,
            location_text: c.case.location_text,
            deleted_at: c.case.deleted_at.unwrap_or(c.case.updated_at),
            log_count: c.log_count,
            photo_count: c.photo_count,
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Recall Cases",
    operation_id = "searchCases",
    summary = "Search cases",
    description = "Case-insensitive substring search over title and client name, active cases only, newest-updated first (cap 50).",
    params(CaseSearchQuery),
    responses(
        (status = 200, description = "Search hits", body = Vec<CaseSearchItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(owner_id = auth_user.user_id))]
pub async fn search_cases(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CaseSearchQuery>,
) -> Result<Json<Vec<CaseSearchItem>>, AppError> {
    let hits = repo::cases::search(&state.db, auth_user.user_id, query.q.as_deref()).await?;
    Ok(Json(hits.into_iter().map(CaseSearchItem::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Recall Cases",
    operation_id = "createCase",
    summary = "Create a case",
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Case created", body = CaseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(owner_id = auth_user.user_id))]
pub async fn create_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_case(&payload)?;

    let case = repo::cases::create(
        &state.db,
        auth_user.user_id,
        payload.title.trim().to_string(),
        trim_to_none(payload.client_name.as_deref()),
        trim_to_none(payload.location_text.as_deref()),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(CaseResponse::from(case))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Recall Cases",
    operation_id = "getCase",
    summary = "Get a case with its logs",
    description = "Returns the case plus its logs (newest first), each log carrying its active photos oldest first. Orphaned rows and trash-staged photos never appear here.",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case detail", body = CaseDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Case not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn get_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseDetailResponse>, AppError> {
    let case = repo::cases::find_active_for_owner(&state.db, id, auth_user.user_id).await?;
    let logs = repo::logs::list_for_case(&state.db, case.id).await?;

    let log_ids: Vec<Uuid> = logs.iter().map(|l| l.id).collect();
    let mut photos = repo::photos::for_logs(&state.db, &log_ids).await?;

    let logs = logs
        .into_iter()
        .map(|log| {
            let mut log_photos = photos.remove(&log.id).unwrap_or_default();
            log_photos.retain(|p| !state.photo_trash.is_staged(auth_user.user_id, p.id));
            CaseLogItem::new(log, log_photos)
        })
        .collect();

    Ok(Json(CaseDetailResponse::new(case, logs)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Recall Cases",
    operation_id = "updateCase",
    summary = "Update a case",
    description = "PATCH semantics: omitted fields are left unchanged; `client_name`/`location_text` set to null (or blank) are cleared.",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = UpdateCaseRequest,
    responses(
        (status = 200, description = "Case updated", body = CaseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Case not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn update_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateCaseRequest>,
) -> Result<Json<CaseResponse>, AppError> {
    validate_update_case(&payload)?;

    let case = repo::cases::find_active_for_owner(&state.db, id, auth_user.user_id).await?;
    let case = repo::cases::update(
        &state.db,
        case,
        payload.title.map(|t| t.trim().to_string()),
        payload.client_name.map(|v| trim_to_none(v.as_deref())),
        payload.location_text.map(|v| trim_to_none(v.as_deref())),
    )
    .await?;

    Ok(Json(CaseResponse::from(case)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Recall Cases",
    operation_id = "deleteCase",
    summary = "Move a case to the trash",
    description = "Soft delete: the case disappears from every active view but its logs, photo rows, and blobs stay put. Restorable at any time.",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 204, description = "Case trashed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Case not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn delete_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let case = repo::cases::find_active_for_owner(&state.db, id, auth_user.user_id).await?;
    repo::cases::soft_delete(&state.db, case).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/restore",
    tag = "Recall Cases",
    operation_id = "restoreCase",
    summary = "Bring a case back from the trash",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case restored", body = CaseResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Case not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn restore_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseResponse>, AppError> {
    let case = repo::cases::find_any_for_owner(&state.db, id, auth_user.user_id).await?;
    let case = repo::cases::restore(&state.db, case).await?;
    Ok(Json(CaseResponse::from(case)))
}
