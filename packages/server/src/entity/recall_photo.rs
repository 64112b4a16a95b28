use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recall_photo")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub log_id: Uuid,
    #[sea_orm(belongs_to, from = "log_id", to = "id")]
    pub log: HasOne<super::recall_log::Entity>,

    /// Denormalized from the log so the owner gate never needs a join.
    pub owner_id: i32,

    /// Bucket path `recall_cases/{caseId}/logs/{logId}/{uuid}.{ext}`.
    /// A blank string marks the row as orphaned: never rendered, never
    /// given a URL, only offered for cleanup. Orphans all share the blank
    /// value, so no unique constraint; uniqueness of real paths comes from
    /// the generated v4 filename.
    pub storage_path: String,
    pub original_filename: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
