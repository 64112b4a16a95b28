use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{recall_case, recall_log, recall_photo};
use crate::error::AppError;
use crate::models::shared::escape_like;

/// Fixed row cap for the deleted-cases view.
pub const DELETED_CASES_LIMIT: u64 = 50;
/// Fixed row cap for case search.
pub const CASE_SEARCH_LIMIT: u64 = 50;

/// A case row with its log and photo counts.
pub struct CaseWithCounts {
    pub case: recall_case::Model,
    pub log_count: i64,
    pub photo_count: i64,
}

/// Fetch an active case through the owner gate.
pub async fn find_active_for_owner(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: i32,
) -> Result<recall_case::Model, AppError> {
    recall_case::Entity::find_by_id(id)
        .filter(recall_case::Column::OwnerId.eq(owner_id))
        .filter(recall_case::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Case not found".into()))
}

/// Fetch a case regardless of deletion state (restore flow).
pub async fn find_any_for_owner(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: i32,
) -> Result<recall_case::Model, AppError> {
    recall_case::Entity::find_by_id(id)
        .filter(recall_case::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Case not found".into()))
}

/// Page of active cases ordered by last update. Fetches one extra row so
/// `has_more` needs no count query.
pub async fn list_active(
    db: &DatabaseConnection,
    owner_id: i32,
    limit: u64,
    offset: u64,
) -> Result<(Vec<CaseWithCounts>, bool), AppError> {
    let limit = limit.clamp(1, 100);
    let mut cases = recall_case::Entity::find()
        .filter(recall_case::Column::OwnerId.eq(owner_id))
        .filter(recall_case::Column::DeletedAt.is_null())
        .order_by(recall_case::Column::UpdatedAt, Order::Desc)
        .offset(Some(offset))
        .limit(Some(limit + 1))
        .all(db)
        .await?;

    let has_more = cases.len() as u64 > limit;
    if has_more {
        cases.truncate(limit as usize);
    }
    let with_counts = attach_counts(db, cases).await?;
    Ok((with_counts, has_more))
}

/// Trashed cases, most recently deleted first.
pub async fn list_deleted(
    db: &DatabaseConnection,
    owner_id: i32,
) -> Result<Vec<CaseWithCounts>, AppError> {
    let cases = recall_case::Entity::find()
        .filter(recall_case::Column::OwnerId.eq(owner_id))
        .filter(recall_case::Column::DeletedAt.is_not_null())
        .order_by(recall_case::Column::DeletedAt, Order::Desc)
        .limit(Some(DELETED_CASES_LIMIT))
        .all(db)
        .await?;
    attach_counts(db, cases).await
}

/// Case-insensitive substring search over title and client name.
/// Hits carry log counts and come back newest-updated first.
pub async fn search(
    db: &DatabaseConnection,
    owner_id: i32,
    q: Option<&str>,
) -> Result<Vec<(recall_case::Model, i64)>, AppError> {
    let mut select = recall_case::Entity::find()
        .filter(recall_case::Column::OwnerId.eq(owner_id))
        .filter(recall_case::Column::DeletedAt.is_null());

    if let Some(q) = q {
        let term = escape_like(q.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(recall_case::Column::Title)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(recall_case::Column::ClientName)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    let cases = select
        .order_by(recall_case::Column::UpdatedAt, Order::Desc)
        .limit(Some(CASE_SEARCH_LIMIT))
        .all(db)
        .await?;
    if cases.is_empty() {
        return Ok(Vec::new());
    }

    let case_ids: Vec<Uuid> = cases.iter().map(|c| c.id).collect();
    let rows: Vec<Uuid> = recall_log::Entity::find()
        .filter(recall_log::Column::CaseId.is_in(case_ids))
        .select_only()
        .column(recall_log::Column::CaseId)
        .into_tuple()
        .all(db)
        .await?;
    let mut log_counts: HashMap<Uuid, i64> = HashMap::new();
    for case_id in rows {
        *log_counts.entry(case_id).or_default() += 1;
    }

    Ok(cases
        .into_iter()
        .map(|c| {
            let n = log_counts.get(&c.id).copied().unwrap_or(0);
            (c, n)
        })
        .collect())
}

pub async fn create(
    db: &DatabaseConnection,
    owner_id: i32,
    title: String,
    client_name: Option<String>,
    location_text: Option<String>,
) -> Result<recall_case::Model, AppError> {
    let now = Utc::now();
    let case = recall_case::ActiveModel {
        id: Set(Uuid::now_v7()),
        owner_id: Set(owner_id),
        title: Set(title),
        client_name: Set(client_name),
        location_text: Set(location_text),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(case.insert(db).await?)
}

/// Apply PATCH semantics: outer `None` leaves a field alone, inner
/// `None` clears a nullable field.
pub async fn update(
    db: &DatabaseConnection,
    case: recall_case::Model,
    title: Option<String>,
    client_name: Option<Option<String>>,
    location_text: Option<Option<String>>,
) -> Result<recall_case::Model, AppError> {
    let mut active: recall_case::ActiveModel = case.into();
    if let Some(title) = title {
        active.title = Set(title);
    }
    if let Some(client_name) = client_name {
        active.client_name = Set(client_name);
    }
    if let Some(location_text) = location_text {
        active.location_text = Set(location_text);
    }
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

/// Move a case to the trash. The row and everything under it stay put.
pub async fn soft_delete(
    db: &DatabaseConnection,
    case: recall_case::Model,
) -> Result<(), AppError> {
    let now = Utc::now();
    let mut active: recall_case::ActiveModel = case.into();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(db).await?;
    Ok(())
}

/// Bring a case back from the trash.
pub async fn restore(
    db: &DatabaseConnection,
    case: recall_case::Model,
) -> Result<recall_case::Model, AppError> {
    let mut active: recall_case::ActiveModel = case.into();
    active.deleted_at = Set(None);
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

/// Per-case log and photo counts, computed in memory from the fetched FK
/// columns rather than SQL joins.
async fn attach_counts(
    db: &DatabaseConnection,
    cases: Vec<recall_case::Model>,
) -> Result<Vec<CaseWithCounts>, AppError> {
    if cases.is_empty() {
        return Ok(Vec::new());
    }
    let case_ids: Vec<Uuid> = cases.iter().map(|c| c.id).collect();

    let log_rows: Vec<(Uuid, Uuid)> = recall_log::Entity::find()
        .filter(recall_log::Column::CaseId.is_in(case_ids))
        .select_only()
        .column(recall_log::Column::Id)
        .column(recall_log::Column::CaseId)
        .into_tuple()
        .all(db)
        .await?;

    let mut log_counts: HashMap<Uuid, i64> = HashMap::new();
    let mut log_to_case: HashMap<Uuid, Uuid> = HashMap::with_capacity(log_rows.len());
    for (log_id, case_id) in log_rows {
        *log_counts.entry(case_id).or_default() += 1;
        log_to_case.insert(log_id, case_id);
    }

    let mut photo_counts: HashMap<Uuid, i64> = HashMap::new();
    if !log_to_case.is_empty() {
        let log_ids: Vec<Uuid> = log_to_case.keys().copied().collect();
        let photo_log_ids: Vec<Uuid> = recall_photo::Entity::find()
            .filter(recall_photo::Column::LogId.is_in(log_ids))
            .select_only()
            .column(recall_photo::Column::LogId)
            .into_tuple()
            .all(db)
            .await?;
        for log_id in photo_log_ids {
            if let Some(case_id) = log_to_case.get(&log_id) {
                *photo_counts.entry(*case_id).or_default() += 1;
            }
        }
    }

    Ok(cases
        .into_iter()
        .map(|case| {
            let log_count = log_counts.get(&case.id).copied().unwrap_or(0);
            let photo_count = photo_counts.get(&case.id).copied().unwrap_or(0);
            CaseWithCounts {
                case,
                log_count,
                photo_count,
            }
        })
        .collect())
}
