use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "showing_photo")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub showing_id: Uuid,
    #[sea_orm(belongs_to, from = "showing_id", to = "id")]
    pub showing: HasOne<super::showing::Entity>,

    /// Bucket path `{showingId}/{uuid}.{ext}`; immutable after creation.
    #[sea_orm(unique)]
    pub storage_path: String,
    pub original_name: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,

    pub uploaded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
