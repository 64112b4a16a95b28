use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{showing, showing_photo};
use crate::error::AppError;
use crate::models::showing::NewShowing;

pub async fn create(
    db: &DatabaseConnection,
    agent_id: i32,
    new: NewShowing,
) -> Result<showing::Model, AppError> {
    let now = Utc::now();
    let model = showing::ActiveModel {
        id: Set(Uuid::now_v7()),
        agent_id: Set(agent_id),
        public_token: Set(Uuid::new_v4()),
        buyer_name: Set(new.buyer_name),
        buyer_phone: Set(new.buyer_phone),
        buyer_email: Set(new.buyer_email),
        address: Set(new.address),
        city: Set(new.city),
        state: Set(new.state),
        zip: Set(new.zip),
        showing_datetime: Set(new.showing_datetime),
        feedback_status: Set(None),
        feedback_note: Set(None),
        feedback_submitted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(model.insert(db).await?)
}

/// Agent's showings, newest first, each with its photo count.
pub async fn list_for_agent(
    db: &DatabaseConnection,
    agent_id: i32,
) -> Result<Vec<(showing::Model, i64)>, AppError> {
    let showings = showing::Entity::find()
        .filter(showing::Column::AgentId.eq(agent_id))
        .order_by(showing::Column::CreatedAt, Order::Desc)
        .all(db)
        .await?;
    if showings.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = showings.iter().map(|s| s.id).collect();
    let rows: Vec<Uuid> = showing_photo::Entity::find()
        .filter(showing_photo::Column::ShowingId.is_in(ids))
        .select_only()
        .column(showing_photo::Column::ShowingId)
        .into_tuple()
        .all(db)
        .await?;
    let mut counts: HashMap<Uuid, i64> = HashMap::new();
    for showing_id in rows {
        *counts.entry(showing_id).or_default() += 1;
    }

    Ok(showings
        .into_iter()
        .map(|s| {
            let n = counts.get(&s.id).copied().unwrap_or(0);
            (s, n)
        })
        .collect())
}

/// Fetch a showing through the agent gate.
pub async fn find_for_agent(
    db: &DatabaseConnection,
    id: Uuid,
    agent_id: i32,
) -> Result<showing::Model, AppError> {
    showing::Entity::find_by_id(id)
        .filter(showing::Column::AgentId.eq(agent_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Showing not found or access denied".into()))
}

/// Public read keyed by the share token, the buyer's only credential.
pub async fn find_by_token(
    db: &DatabaseConnection,
    token: Uuid,
) -> Result<showing::Model, AppError> {
    showing::Entity::find()
        .filter(showing::Column::PublicToken.eq(token))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Showing not found".into()))
}

/// Photos of a showing in upload order.
pub async fn photos_for_showing(
    db: &DatabaseConnection,
    showing_id: Uuid,
) -> Result<Vec<showing_photo::Model>, AppError> {
    Ok(showing_photo::Entity::find()
        .filter(showing_photo::Column::ShowingId.eq(showing_id))
        .order_by(showing_photo::Column::UploadedAt, Order::Asc)
        .all(db)
        .await?)
}

/// Stored photo count for the per-showing total cap.
pub async fn count_photos(db: &DatabaseConnection, showing_id: Uuid) -> Result<u64, AppError> {
    Ok(showing_photo::Entity::find()
        .filter(showing_photo::Column::ShowingId.eq(showing_id))
        .count(db)
        .await?)
}

pub async fn create_photo(
    db: &DatabaseConnection,
    showing_id: Uuid,
    storage_path: String,
    original_name: String,
    file_size: Option<i64>,
    mime_type: Option<String>,
) -> Result<showing_photo::Model, AppError> {
    let photo = showing_photo::ActiveModel {
        id: Set(Uuid::now_v7()),
        showing_id: Set(showing_id),
        storage_path: Set(storage_path),
        original_name: Set(original_name),
        file_size: Set(file_size),
        mime_type: Set(mime_type),
        uploaded_at: Set(Utc::now()),
    };
    Ok(photo.insert(db).await?)
}

/// One atomic UPDATE keyed by the public token. Returns `false` when the
/// token matches nothing; resubmission overwrites in place.
pub async fn submit_feedback(
    db: &DatabaseConnection,
    token: Uuid,
    status: String,
    note: Option<String>,
) -> Result<bool, AppError> {
    let now = Utc::now();
    let result = showing::Entity::update_many()
        .filter(showing::Column::PublicToken.eq(token))
        .col_expr(showing::Column::FeedbackStatus, Expr::value(Some(status)))
        .col_expr(showing::Column::FeedbackNote, Expr::value(note))
        .col_expr(showing::Column::FeedbackSubmittedAt, Expr::value(Some(now)))
        .col_expr(showing::Column::UpdatedAt, Expr::value(now))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}
