use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{recall_case, recall_log, recall_photo};
use crate::error::AppError;
use crate::models::shared::escape_like;

/// Fixed row cap for log search.
pub const LOG_SEARCH_LIMIT: u64 = 100;

/// Filters for log search; all optional and combined with AND.
#[derive(Default)]
pub struct LogSearchFilters {
    pub q: Option<String>,
    pub case_id: Option<Uuid>,
    pub log_type: Option<String>,
}

/// A log search hit with its case header and photo count.
pub struct LogSearchHit {
    pub log: recall_log::Model,
    pub case_title: String,
    pub case_client_name: Option<String>,
    pub photo_count: i64,
}

/// Fetch a log through the owner gate. The gate never joins: logs carry
/// a denormalized `owner_id`.
pub async fn find_for_owner(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: i32,
) -> Result<recall_log::Model, AppError> {
    recall_log::Entity::find_by_id(id)
        .filter(recall_log::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Log not found".into()))
}

/// Logs of one case, newest first.
pub async fn list_for_case(
    db: &DatabaseConnection,
    case_id: Uuid,
) -> Result<Vec<recall_log::Model>, AppError> {
    Ok(recall_log::Entity::find()
        .filter(recall_log::Column::CaseId.eq(case_id))
        .order_by(recall_log::Column::CreatedAt, Order::Desc)
        .all(db)
        .await?)
}

pub async fn create(
    db: &DatabaseConnection,
    case_id: Uuid,
    owner_id: i32,
    log_type: String,
    note: String,
) -> Result<recall_log::Model, AppError> {
    let now = Utc::now();
    let log = recall_log::ActiveModel {
        id: Set(Uuid::now_v7()),
        case_id: Set(case_id),
        owner_id: Set(owner_id),
        log_type: Set(log_type),
        note: Set(note),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let log = log.insert(db).await?;
    touch_case(db, case_id).await?;
    Ok(log)
}

pub async fn update(
    db: &DatabaseConnection,
    log: recall_log::Model,
    log_type: Option<String>,
    note: Option<String>,
) -> Result<recall_log::Model, AppError> {
    let case_id = log.case_id;
    let mut active: recall_log::ActiveModel = log.into();
    if let Some(log_type) = log_type {
        active.log_type = Set(log_type);
    }
    if let Some(note) = note {
        active.note = Set(note);
    }
    active.updated_at = Set(Utc::now());
    let log = active.update(db).await?;
    touch_case(db, case_id).await?;
    Ok(log)
}

/// Delete a log and its photo rows in one transaction. Blob removal is
/// the caller's job and must happen first.
pub async fn hard_delete(db: &DatabaseConnection, log: recall_log::Model) -> Result<(), AppError> {
    let txn = db.begin().await?;
    recall_photo::Entity::delete_many()
        .filter(recall_photo::Column::LogId.eq(log.id))
        .exec(&txn)
        .await?;
    recall_log::Entity::delete_by_id(log.id).exec(&txn).await?;
    touch_case(&txn, log.case_id).await?;
    txn.commit().await?;
    Ok(())
}

/// Search logs by note substring, case, and type. Logs of trashed cases
/// stay hidden. Hits come back newest first with case headers attached.
pub async fn search(
    db: &DatabaseConnection,
    owner_id: i32,
    filters: LogSearchFilters,
) -> Result<Vec<LogSearchHit>, AppError> {
    let mut select = recall_log::Entity::find().filter(recall_log::Column::OwnerId.eq(owner_id));

    if let Some(case_id) = filters.case_id {
        select = select.filter(recall_log::Column::CaseId.eq(case_id));
    }
    if let Some(ref log_type) = filters.log_type {
        select = select.filter(recall_log::Column::LogType.eq(log_type));
    }
    if let Some(ref q) = filters.q {
        let term = escape_like(q.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(recall_log::Column::Note)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let logs = select
        .order_by(recall_log::Column::CreatedAt, Order::Desc)
        .limit(Some(LOG_SEARCH_LIMIT))
        .all(db)
        .await?;
    if logs.is_empty() {
        return Ok(Vec::new());
    }

    let log_ids: Vec<Uuid> = logs.iter().map(|l| l.id).collect();
    let photo_counts = super::photos::count_by_log(db, &log_ids).await?;

    let case_ids: Vec<Uuid> = logs.iter().map(|l| l.case_id).collect();
    let headers: HashMap<Uuid, (String, Option<String>)> = recall_case::Entity::find()
        .filter(recall_case::Column::Id.is_in(case_ids))
        .filter(recall_case::Column::DeletedAt.is_null())
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, (c.title, c.client_name)))
        .collect();

    Ok(logs
        .into_iter()
        .filter_map(|log| {
            let (case_title, case_client_name) = headers.get(&log.case_id).cloned()?;
            let photo_count = photo_counts.get(&log.id).copied().unwrap_or(0);
            Some(LogSearchHit {
                log,
                case_title,
                case_client_name,
                photo_count,
            })
        })
        .collect())
}

/// Bump the parent case's `updated_at` so it floats in recency views.
async fn touch_case<C: ConnectionTrait>(conn: &C, case_id: Uuid) -> Result<(), DbErr> {
    recall_case::Entity::update_many()
        .filter(recall_case::Column::Id.eq(case_id))
        .col_expr(recall_case::Column::UpdatedAt, Expr::value(Utc::now()))
        .exec(conn)
        .await?;
    Ok(())
}
