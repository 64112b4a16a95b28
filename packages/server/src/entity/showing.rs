use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "showing")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub agent_id: i32,
    #[sea_orm(belongs_to, from = "agent_id", to = "id")]
    pub agent: HasOne<super::user::Entity>,

    /// UUIDv4 link token. The only credential for the buyer feedback flow;
    /// immutable after creation.
    #[sea_orm(unique)]
    pub public_token: Uuid,

    pub buyer_name: String,
    /// E.164 phone number (+, then digits).
    pub buyer_phone: String,
    pub buyer_email: Option<String>,

    pub address: String,
    pub city: String,
    /// Two-letter state code, stored uppercase.
    pub state: String,
    pub zip: String,
    pub showing_datetime: DateTimeUtc,

    /// One of: INTERESTED, MAYBE, NOT_FOR_US. NULL until feedback arrives.
    pub feedback_status: Option<String>,
    pub feedback_note: Option<String>,
    pub feedback_submitted_at: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub photos: HasMany<super::showing_photo::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
