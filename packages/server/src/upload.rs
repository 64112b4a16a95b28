//! Photo ingestion shared by the recall-log and showing upload endpoints.
//!
//! A batch runs in two stages: a lenient pass that rejects individual files
//! without blocking the rest, then a strict sequential pass that stores each
//! blob and its metadata row before the next file begins. The first in-flight
//! failure aborts the remainder; files already completed are kept.

use axum::extract::Multipart;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use common::ObjectStore;

use crate::entity::{recall_photo, showing_photo};
use crate::error::AppError;
use crate::repo;
use crate::utils::filename::blob_extension;

const RECALL_BATCH_CAP: usize = 8;
const RECALL_MAX_BYTES: usize = 5 * 1024 * 1024;
const SHOWING_TOTAL_CAP: u64 = 10;
const SHOWING_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Where a batch lands. Each target fixes the path prefix, the per-file
/// rules, and which metadata table receives the rows.
pub enum UploadTarget {
    RecallLog {
        case_id: Uuid,
        log_id: Uuid,
        owner_id: i32,
    },
    Showing {
        showing_id: Uuid,
    },
}

/// One multipart file as read off the wire.
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A file turned away during validation, with the reason shown to the user.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct RejectedFile {
    #[schema(example = "floor_plan.tiff")]
    pub filename: String,
    #[schema(example = "Only image files are allowed")]
    pub reason: String,
}

/// A stored photo row, shaped by the batch target.
pub enum UploadedPhoto {
    Recall(recall_photo::Model),
    Showing(showing_photo::Model),
}

/// Rows created by the strict stage plus the rejections from the lenient one.
pub struct BatchOutcome {
    pub uploaded: Vec<UploadedPhoto>,
    pub rejected: Vec<RejectedFile>,
}

/// Coarse per-file progress. Reported once per stage, never byte-level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMilestone {
    Queued,
    BlobStored,
    RecordStored,
}

impl UploadMilestone {
    pub fn percent(self) -> u8 {
        match self {
            UploadMilestone::Queued => 0,
            UploadMilestone::BlobStored => 50,
            UploadMilestone::RecordStored => 100,
        }
    }
}

/// Ingest one batch of files for `target`.
///
/// Count caps apply to the files that survive validation: more than 8 per
/// batch for a recall log, or more than 10 total across a showing, fails the
/// whole request before anything is stored. A blob whose metadata row write
/// fails stays behind as an orphan; there is no rollback.
pub async fn upload_batch<F>(
    store: &dyn ObjectStore,
    db: &DatabaseConnection,
    target: UploadTarget,
    files: Vec<IncomingFile>,
    mut on_progress: F,
) -> Result<BatchOutcome, AppError>
where
    F: FnMut(&str, UploadMilestone),
{
    let mut valid = Vec::new();
    let mut rejected = Vec::new();
    for file in files {
        match rejection_reason(&target, &file) {
            Some(reason) => rejected.push(RejectedFile {
                filename: file.filename.clone(),
                reason,
            }),
            None => valid.push(file),
        }
    }

    match &target {
        UploadTarget::RecallLog { .. } => {
            if valid.len() > RECALL_BATCH_CAP {
                return Err(AppError::Validation("Maximum 8 photos per log".into()));
            }
        }
        UploadTarget::Showing { showing_id } => {
            let existing = repo::showings::count_photos(db, *showing_id).await?;
            if existing + valid.len() as u64 > SHOWING_TOTAL_CAP {
                return Err(AppError::Validation(format!(
                    "Maximum 10 photos allowed (you have {existing} already)"
                )));
            }
        }
    }

    let mut uploaded = Vec::new();
    for file in valid {
        on_progress(&file.filename, UploadMilestone::Queued);

        let path = object_path(&target, &file.filename);
        let stored_path = store
            .upload(&path, &file.bytes, &file.content_type)
            .await
            .map_err(|e| {
                AppError::Upload(format!("Upload failed for {}: {}", file.filename, e))
            })?;
        on_progress(&file.filename, UploadMilestone::BlobStored);

        let row = match &target {
            UploadTarget::RecallLog {
                log_id, owner_id, ..
            } => repo::photos::create(
                db,
                *log_id,
                *owner_id,
                stored_path.clone(),
                Some(file.filename.clone()),
            )
            .await
            .map(UploadedPhoto::Recall),
            UploadTarget::Showing { showing_id } => repo::showings::create_photo(
                db,
                *showing_id,
                stored_path.clone(),
                file.filename.clone(),
                Some(file.bytes.len() as i64),
                Some(file.content_type.clone()),
            )
            .await
            .map(UploadedPhoto::Showing),
        };
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(
                    path = %stored_path,
                    "Photo row write failed after blob upload; blob left orphaned"
                );
                return Err(e);
            }
        };
        on_progress(&file.filename, UploadMilestone::RecordStored);
        uploaded.push(row);
    }

    Ok(BatchOutcome { uploaded, rejected })
}

/// Read every file field out of a multipart request. Field names are not
/// significant; fields without a filename are ordinary form fields and are
/// ignored.
pub async fn collect_multipart_files(
    multipart: &mut Multipart,
) -> Result<Vec<IncomingFile>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string).unwrap_or_default();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
        files.push(IncomingFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}

/// Why `file` cannot be ingested for `target`, or `None` if it can.
fn rejection_reason(target: &UploadTarget, file: &IncomingFile) -> Option<String> {
    if file.filename.trim().is_empty() {
        return Some("Missing filename".into());
    }
    let content_type = file.content_type.trim().to_ascii_lowercase();
    match target {
        UploadTarget::RecallLog { .. } => {
            if !content_type.starts_with("image/") {
                return Some("Only image files are allowed".into());
            }
            if file.bytes.len() > RECALL_MAX_BYTES {
                return Some("Files must be less than 5MB each".into());
            }
        }
        UploadTarget::Showing { .. } => {
            if !content_type.starts_with("image/") {
                return Some(format!("{} is not an image file", file.filename));
            }
            if file.bytes.len() > SHOWING_MAX_BYTES {
                return Some(format!("{} is too large (max 10MB)", file.filename));
            }
            if !matches!(content_type.as_str(), "image/jpeg" | "image/jpg" | "image/png") {
                return Some(format!("{} must be JPG or PNG format", file.filename));
            }
        }
    }
    None
}

/// Destination paths are server-generated; only a sanitized extension comes
/// from the client filename.
fn object_path(target: &UploadTarget, filename: &str) -> String {
    let ext = blob_extension(Some(filename));
    let blob = Uuid::new_v4();
    match target {
        UploadTarget::RecallLog {
            case_id, log_id, ..
        } => format!("recall_cases/{case_id}/logs/{log_id}/{blob}.{ext}"),
        UploadTarget::Showing { showing_id } => format!("{showing_id}/{blob}.{ext}"),
    }
}
