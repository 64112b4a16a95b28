use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{recall_case, recall_log, recall_photo};
use crate::error::AppError;

use super::shared::{double_option, validate_title};

/// Request body for creating a case.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCaseRequest {
    #[schema(example = "Smith kitchen remodel")]
    pub title: String,
    /// Optional client name.
    #[schema(example = "John Smith")]
    pub client_name: Option<String>,
    /// Optional free-text location.
    #[schema(example = "420 Oak Ave, Unit 2")]
    pub location_text: Option<String>,
}

pub fn validate_create_case(req: &CreateCaseRequest) -> Result<(), AppError> {
    validate_title(&req.title)
}

/// PATCH body for a case. Omitted fields are left unchanged; explicit
/// nulls clear the nullable fields.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateCaseRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub client_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub location_text: Option<Option<String>>,
}

pub fn validate_update_case(req: &UpdateCaseRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    Ok(())
}

/// A case record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CaseResponse {
    pub id: Uuid,
    #[schema(example = "Smith kitchen remodel")]
    pub title: String,
    pub client_name: Option<String>,
    pub location_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<recall_case::Model> for CaseResponse {
    fn from(m: recall_case::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            client_name: m.client_name,
            location_text: m.location_text,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// List row: case plus log and photo counts.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CaseListItem {
    pub id: Uuid,
    pub title: String,
    pub client_name: Option<String>,
    pub location_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[schema(example = 3)]
    pub log_count: i64,
    #[schema(example = 12)]
    pub photo_count: i64,
}

impl From<(recall_case::Model, i64, i64)> for CaseListItem {
    fn from((m, log_count, photo_count): (recall_case::Model, i64, i64)) -> Self {
        Self {
            id: m.id,
            title: m.title,
            client_name: m.client_name,
            location_text: m.location_text,
            created_at: m.created_at,
            updated_at: m.updated_at,
            log_count,
            photo_count,
        }
    }
}

/// Page of active cases ordered by last update.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CaseListResponse {
    pub data: Vec<CaseListItem>,
    /// True when another page exists past this one.
    pub has_more: bool,
}

/// Query parameters for the case list.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CaseListQuery {
    /// Page size (default 20, max 100).
    #[param(example = 20)]
    pub limit: Option<u64>,
    /// Rows to skip.
    #[param(example = 0)]
    pub offset: Option<u64>,
}

/// List row for the deleted-cases view.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DeletedCaseListItem {
    pub id: Uuid,
    pub title: String,
    pub client_name: Option<String>,
    pub location_text: Option<String>,
    /// When the case was moved to the trash.
    pub deleted_at: DateTime<Utc>,
    pub log_count: i64,
    pub photo_count: i64,
}

/// Query parameters for case search.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CaseSearchQuery {
    /// Substring to match against title and client name (case-insensitive).
    #[param(example = "kitchen")]
    pub q: Option<String>,
}

/// Query parameters for the whole-case ZIP export.
#[derive(Deserialize, Default, utoipa::IntoParams)]
pub struct CaseZipQuery {
    /// Comma-separated photo IDs to include. Omit to export every photo.
    pub photo_ids: Option<String>,
}

/// Search hit: case plus log count.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CaseSearchItem {
    pub id: Uuid,
    pub title: String,
    pub client_name: Option<String>,
    pub location_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub log_count: i64,
}

impl From<(recall_case::Model, i64)> for CaseSearchItem {
    fn from((m, log_count): (recall_case::Model, i64)) -> Self {
        Self {
            id: m.id,
            title: m.title,
            client_name: m.client_name,
            location_text: m.location_text,
            created_at: m.created_at,
            updated_at: m.updated_at,
            log_count,
        }
    }
}

/// Photo metadata embedded in the case detail view.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CasePhotoItem {
    pub id: Uuid,
    #[schema(example = "IMG_2041.jpg")]
    pub original_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<recall_photo::Model> for CasePhotoItem {
    fn from(m: recall_photo::Model) -> Self {
        Self {
            id: m.id,
            original_filename: m.original_filename,
            created_at: m.created_at,
        }
    }
}

/// Log embedded in the case detail view.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CaseLogItem {
    pub id: Uuid,
    #[schema(example = "Issue")]
    pub log_type: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Active photos of this log, oldest first.
    pub photos: Vec<CasePhotoItem>,
}

impl CaseLogItem {
    pub fn new(m: recall_log::Model, photos: Vec<recall_photo::Model>) -> Self {
        Self {
            id: m.id,
            log_type: m.log_type,
            note: m.note,
            created_at: m.created_at,
            updated_at: m.updated_at,
            photos: photos.into_iter().map(CasePhotoItem::from).collect(),
        }
    }
}

/// Case detail: the case plus its logs (newest first).
#[derive(Serialize, utoipa::ToSchema)]
pub struct CaseDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub client_name: Option<String>,
    pub location_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub logs: Vec<CaseLogItem>,
}

impl CaseDetailResponse {
    pub fn new(m: recall_case::Model, logs: Vec<CaseLogItem>) -> Self {
        Self {
            id: m.id,
            title: m.title,
            client_name: m.client_name,
            location_text: m.location_text,
            created_at: m.created_at,
            updated_at: m.updated_at,
            logs,
        }
    }
}
