use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::recall_log;
use crate::error::AppError;

/// Request body for adding a log to a case.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateLogRequest {
    /// One of the configured compose log types.
    #[schema(example = "Issue")]
    pub log_type: String,
    /// Free-text note; may be blank when photos carry the content.
    #[schema(example = "Pipe joint leaking behind the north wall")]
    pub note: String,
}

/// PATCH body for a log.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateLogRequest {
    /// One of the configured edit log types.
    #[schema(example = "Resolution")]
    pub log_type: Option<String>,
    pub note: Option<String>,
}

/// Validate a log type against a configured closed set.
pub fn validate_log_type(log_type: &str, allowed: &[String]) -> Result<(), AppError> {
    if !allowed.iter().any(|t| t == log_type) {
        return Err(AppError::Validation(format!(
            "Invalid log type '{}'. Allowed: {}",
            log_type,
            allowed.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_note(note: &str) -> Result<(), AppError> {
    if note.chars().count() > 2000 {
        return Err(AppError::Validation(
            "Note must be at most 2000 characters".into(),
        ));
    }
    Ok(())
}

/// A log record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LogResponse {
    pub id: Uuid,
    pub case_id: Uuid,
    #[schema(example = "Issue")]
    pub log_type: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<recall_log::Model> for LogResponse {
    fn from(m: recall_log::Model) -> Self {
        Self {
            id: m.id,
            case_id: m.case_id,
            log_type: m.log_type,
            note: m.note,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Case fields embedded in log views.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CaseHeader {
    #[schema(example = "Smith kitchen remodel")]
    pub title: String,
    pub client_name: Option<String>,
}

/// Photo in the log detail view with a short-lived viewing URL.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LogPhotoItem {
    pub id: Uuid,
    #[schema(example = "IMG_2041.jpg")]
    pub original_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Signed viewing URL (10 minutes), or null when minting failed.
    pub url: Option<String>,
}

/// Log detail: the log, its case header, and active photos.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LogDetailResponse {
    pub id: Uuid,
    pub case_id: Uuid,
    pub log_type: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub case: CaseHeader,
    /// Active photos, oldest first. Photos staged in the trash are hidden.
    pub photos: Vec<LogPhotoItem>,
    /// Rows without a stored blob; removable via the cleanup endpoint.
    #[schema(example = 0)]
    pub orphaned_count: i64,
}

/// Query parameters for log search.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LogSearchQuery {
    /// Substring to match against notes (case-insensitive).
    #[param(example = "leak")]
    pub q: Option<String>,
    /// Restrict to one case.
    pub case_id: Option<Uuid>,
    /// Restrict to one log type.
    #[param(example = "Issue")]
    pub log_type: Option<String>,
}

/// Search hit: log plus its case header and photo count.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LogSearchItem {
    pub id: Uuid,
    pub case_id: Uuid,
    pub log_type: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub case: CaseHeader,
    pub photo_count: i64,
}
