use axum::{Json, extract::State};
use common::storage::ObjectStore;
use tracing::instrument;

use crate::error::ErrorBody;
use crate::extractors::auth::AuthUser;
use crate::models::shared::StorageHealthResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/storage/health",
    tag = "Storage",
    operation_id = "storageHealth",
    summary = "Probe both storage buckets",
    description = "Reports reachability per bucket. A `false` means uploads and downloads against that bucket will fail right now.",
    responses(
        (status = 200, description = "Bucket reachability", body = StorageHealthResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = auth_user.user_id))]
pub async fn storage_health(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Json<StorageHealthResponse> {
    Json(StorageHealthResponse {
        recall: probe(state.recall_store.as_ref()).await,
        showing_photos: probe(state.showing_store.as_ref()).await,
    })
}

async fn probe(store: &dyn ObjectStore) -> bool {
    match store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(bucket = store.bucket_name(), error = %e, "Storage health check failed");
            false
        }
    }
}
