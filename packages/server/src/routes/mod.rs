mod v1;

use utoipa_axum::router::OpenApiRouter;

use crate::state::AppState;

/// Everything the server exposes, mounted under `/api`.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/v1", v1::routes())
}
