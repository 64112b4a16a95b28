use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::recall_photo;
use crate::trash::StagedPhoto;
use crate::upload::RejectedFile;

/// A stored photo record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub log_id: Uuid,
    #[schema(example = "IMG_2041.jpg")]
    pub original_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<recall_photo::Model> for PhotoResponse {
    fn from(m: recall_photo::Model) -> Self {
        Self {
            id: m.id,
            log_id: m.log_id,
            original_filename: m.original_filename,
            created_at: m.created_at,
        }
    }
}

/// Batch upload outcome for a log.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LogUploadResponse {
    /// Photos stored by this request, one per ingested file.
    pub uploaded: Vec<PhotoResponse>,
    /// Files turned away during validation, with the reason for each.
    pub rejected: Vec<RejectedFile>,
}

/// A photo sitting in the ephemeral trash.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TrashedPhotoItem {
    pub id: Uuid,
    pub log_id: Uuid,
    pub original_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    /// When the photo was staged.
    pub trashed_at: DateTime<Utc>,
}

impl From<&StagedPhoto> for TrashedPhotoItem {
    fn from(staged: &StagedPhoto) -> Self {
        Self {
            id: staged.photo.id,
            log_id: staged.photo.log_id,
            original_filename: staged.photo.original_filename.clone(),
            created_at: staged.photo.created_at,
            trashed_at: staged.trashed_at,
        }
    }
}

/// Photos currently staged in the trash for one log.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TrashListResponse {
    pub photos: Vec<TrashedPhotoItem>,
}

/// Result of emptying a log's trash or purging orphaned rows.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PurgeResponse {
    /// Number of photo rows permanently removed.
    #[schema(example = 2)]
    pub purged: u64,
}
