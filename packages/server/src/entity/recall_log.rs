use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recall_log")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub case_id: Uuid,
    #[sea_orm(belongs_to, from = "case_id", to = "id")]
    pub case: HasOne<super::recall_case::Entity>,

    /// Denormalized from the case so the owner gate never needs a join.
    pub owner_id: i32,

    /// One of the configured log type lists (create and edit lists differ).
    pub log_type: String,
    /// Free text, at most 2000 characters.
    #[sea_orm(column_type = "Text")]
    pub note: String,

    #[sea_orm(has_many)]
    pub photos: HasMany<super::recall_photo::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
