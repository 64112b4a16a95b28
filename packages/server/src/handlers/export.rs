use std::collections::{HashMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::body::Body;
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::recall_photo;
use crate::error::{AppError, ErrorBody};
use crate::export::{LogBundle, pdf, zip};
use crate::extractors::auth::AuthUser;
use crate::models::case::CaseZipQuery;
use crate::repo;
use crate::state::AppState;
use crate::utils::filename::{content_disposition_value, report_slug, sanitize_archive_filename};

#[utoipa::path(
    get,
    path = "/{id}/export/pdf",
    tag = "Export",
    operation_id = "exportCasePdf",
    summary = "Export a case as a PDF report",
    description = "Renders the case header and every log chronologically, with photo filenames listed per log. Photo bytes are not embedded.",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "PDF report", content_type = "application/pdf"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Case not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Report assembly failed (EXPORT_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn export_case_pdf(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let case = repo::cases::find_active_for_owner(&state.db, id, auth_user.user_id).await?;
    let bundles = case_bundles(&state, case.id).await?;

    let bytes = pdf::case_report(&case, &bundles)?;
    let filename = format!("{}_case_report.pdf", report_slug(&case.title));

    file_response(bytes, "application/pdf", &filename)
}

#[utoipa::path(
    get,
    path = "/{id}/export/zip",
    tag = "Export",
    operation_id = "exportCaseZip",
    summary = "Export a case's photos as a ZIP archive",
    description = "Bundles photos into per-log folders alongside a plain-text case summary. \
        `photo_ids` narrows the export to a selection; photos whose download fails are skipped.",
    params(("id" = Uuid, Path, description = "Case ID"), CaseZipQuery),
    responses(
        (status = 200, description = "ZIP archive", content_type = "application/zip"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Case not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Nothing to export or assembly failed (EXPORT_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn export_case_zip(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CaseZipQuery>,
) -> Result<Response, AppError> {
    let case = repo::cases::find_active_for_owner(&state.db, id, auth_user.user_id).await?;
    let bundles = case_bundles(&state, case.id).await?;

    let selection = match query.photo_ids.as_deref() {
        Some(raw) => Some(parse_photo_ids(raw)?),
        None => None,
    };

    let bytes = zip::case_archive(
        state.recall_store.as_ref(),
        &case,
        &bundles,
        selection.as_ref(),
    )
    .await?;
    let filename = format!("{}_photos.zip", report_slug(&case.title));

    file_response(bytes, "application/zip", &filename)
}

#[utoipa::path(
    get,
    path = "/{id}/export/zip",
    tag = "Export",
    operation_id = "exportLogZip",
    summary = "Export a single log's photos as a ZIP archive",
    description = "Flat archive of the log's active photos. Fails when the log has none.",
    params(("id" = Uuid, Path, description = "Log ID")),
    responses(
        (status = 200, description = "ZIP archive", content_type = "application/zip"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Log not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Nothing to export or assembly failed (EXPORT_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id, id = %id))]
pub async fn export_log_zip(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let log = repo::logs::find_for_owner(&state.db, id, auth_user.user_id).await?;
    let case = repo::cases::find_any_for_owner(&state.db, log.case_id, auth_user.user_id).await?;
    let photos = repo::photos::for_log(&state.db, log.id).await?;

    let bytes = zip::log_archive(state.recall_store.as_ref(), &photos).await?;
    let filename = sanitize_archive_filename(&format!(
        "{}_{}_{}_photos.zip",
        case.title,
        log.log_type,
        Utc::now().format("%Y-%m-%d")
    ));

    file_response(bytes, "application/zip", &filename)
}

/// Load every log of a case with its photo rows, orphans included so the
/// report can name files whose blob is gone.
async fn case_bundles(state: &AppState, case_id: Uuid) -> Result<Vec<LogBundle>, AppError> {
    let logs = repo::logs::list_for_case(&state.db, case_id).await?;
    let mut by_log: HashMap<Uuid, Vec<recall_photo::Model>> = HashMap::new();
    for photo in repo::photos::all_for_case(&state.db, case_id).await? {
        by_log.entry(photo.log_id).or_default().push(photo);
    }

    Ok(logs
        .into_iter()
        .map(|log| {
            let photos = by_log.remove(&log.id).unwrap_or_default();
            LogBundle { log, photos }
        })
        .collect())
}

fn parse_photo_ids(raw: &str) -> Result<HashSet<Uuid>, AppError> {
    let mut ids = HashSet::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = Uuid::parse_str(part)
            .map_err(|_| AppError::Validation(format!("Invalid photo ID '{part}'")))?;
        ids.insert(id);
    }
    Ok(ids)
}

fn file_response(bytes: Vec<u8>, content_type: &str, filename: &str) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, bytes.len().to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(filename),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
