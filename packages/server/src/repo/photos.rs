use std::collections::HashMap;

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{recall_log, recall_photo};
use crate::error::AppError;

pub async fn create(
    db: &DatabaseConnection,
    log_id: Uuid,
    owner_id: i32,
    storage_path: String,
    original_filename: Option<String>,
) -> Result<recall_photo::Model, AppError> {
    let photo = recall_photo::ActiveModel {
        id: Set(Uuid::now_v7()),
        log_id: Set(log_id),
        owner_id: Set(owner_id),
        storage_path: Set(storage_path),
        original_filename: Set(original_filename),
        created_at: Set(Utc::now()),
    };
    Ok(photo.insert(db).await?)
}

/// Fetch a photo through the owner gate.
pub async fn find_for_owner(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: i32,
) -> Result<recall_photo::Model, AppError> {
    recall_photo::Entity::find_by_id(id)
        .filter(recall_photo::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".into()))
}

/// Active photos of a log, oldest first. Rows with a blank storage path
/// are orphaned and excluded.
pub async fn for_log(
    db: &DatabaseConnection,
    log_id: Uuid,
) -> Result<Vec<recall_photo::Model>, AppError> {
    let photos = recall_photo::Entity::find()
        .filter(recall_photo::Column::LogId.eq(log_id))
        .order_by(recall_photo::Column::CreatedAt, Order::Asc)
        .all(db)
        .await?;
    Ok(photos
        .into_iter()
        .filter(|p| !p.storage_path.trim().is_empty())
        .collect())
}

/// Orphaned rows of a log: photo records whose blob was never stored.
pub async fn orphaned_for_log(
    db: &DatabaseConnection,
    log_id: Uuid,
) -> Result<Vec<recall_photo::Model>, AppError> {
    let photos = recall_photo::Entity::find()
        .filter(recall_photo::Column::LogId.eq(log_id))
        .all(db)
        .await?;
    Ok(photos
        .into_iter()
        .filter(|p| p.storage_path.trim().is_empty())
        .collect())
}

/// Active photos of several logs, grouped by log, oldest first within
/// each group (case detail view).
pub async fn for_logs(
    db: &DatabaseConnection,
    log_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<recall_photo::Model>>, AppError> {
    if log_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let photos = recall_photo::Entity::find()
        .filter(recall_photo::Column::LogId.is_in(log_ids.to_vec()))
        .order_by(recall_photo::Column::CreatedAt, Order::Asc)
        .all(db)
        .await?;
    let mut grouped: HashMap<Uuid, Vec<recall_photo::Model>> = HashMap::new();
    for photo in photos {
        if photo.storage_path.trim().is_empty() {
            continue;
        }
        grouped.entry(photo.log_id).or_default().push(photo);
    }
    Ok(grouped)
}

/// Every photo of a case, newest first, orphans included (export flows
/// treat a blank path like any other failed download).
pub async fn all_for_case(
    db: &DatabaseConnection,
    case_id: Uuid,
) -> Result<Vec<recall_photo::Model>, AppError> {
    let log_ids: Vec<Uuid> = recall_log::Entity::find()
        .filter(recall_log::Column::CaseId.eq(case_id))
        .select_only()
        .column(recall_log::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    if log_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(recall_photo::Entity::find()
        .filter(recall_photo::Column::LogId.is_in(log_ids))
        .order_by(recall_photo::Column::CreatedAt, Order::Desc)
        .all(db)
        .await?)
}

/// Remove one photo row. Blob removal is the caller's job.
pub async fn delete_row(db: &DatabaseConnection, id: Uuid) -> Result<(), AppError> {
    recall_photo::Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

/// Purge a log's orphaned rows; returns how many went away.
pub async fn cleanup_orphaned(
    db: &DatabaseConnection,
    log_id: Uuid,
    owner_id: i32,
) -> Result<u64, AppError> {
    let ids: Vec<Uuid> = orphaned_for_log(db, log_id)
        .await?
        .into_iter()
        .filter(|p| p.owner_id == owner_id)
        .map(|p| p.id)
        .collect();
    if ids.is_empty() {
        return Ok(0);
    }
    let result = recall_photo::Entity::delete_many()
        .filter(recall_photo::Column::Id.is_in(ids))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Photo counts per log, computed in memory from the FK column.
pub async fn count_by_log(
    db: &DatabaseConnection,
    log_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, AppError> {
    if log_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<Uuid> = recall_photo::Entity::find()
        .filter(recall_photo::Column::LogId.is_in(log_ids.to_vec()))
        .select_only()
        .column(recall_photo::Column::LogId)
        .into_tuple()
        .all(db)
        .await?;
    let mut counts = HashMap::new();
    for log_id in rows {
        *counts.entry(log_id).or_default() += 1;
    }
    Ok(counts)
}
