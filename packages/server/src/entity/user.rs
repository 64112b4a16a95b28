use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An agent account. Owns showings and recall cases; there is no role
/// tier, every account has the same capabilities.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC hash string, never the raw password.
    pub password: String,

    #[sea_orm(has_many)]
    pub showings: HasMany<super::showing::Entity>,

    #[sea_orm(has_many)]
    pub recall_cases: HasMany<super::recall_case::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
