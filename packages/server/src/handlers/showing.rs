use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::showing::{
    CreateShowingRequest, CreateShowingResponse, ShowingDetailResponse, ShowingListItem,
    ShowingPhotoResponse, ShowingResponse, validate_create_showing,
};
use crate::repo;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Showings",
    operation_id = "createShowing",
    summary = "Create a showing",
    description = "Creates a showing and mints its public feedback token. The response carries the shareable `/r/{token}` link for the buyer.",
    request_body = CreateShowingRequest,
    responses(
        (status = 201, description = "Showing created", body = CreateShowingResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(agent_id = auth_user.user_id))]
pub async fn create_showing(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateShowingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = validate_create_showing(&payload)?;

    let showing = repo::showings::create(&state.db, auth_user.user_id, new).await?;
    let public_url = format!(
        "{}/r/{}",
        state.config.server.public_base_url, showing.public_token
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateShowingResponse {
            showing: showing.into(),
            public_url,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Showings",
    operation_id = "listShowings",
    summary = "List the agent's showings",
    description = "Returns the authenticated agent's showings, newest first, each with its stored photo count.",
    responses(
        (status = 200, description = "Showings", body = Vec<ShowingListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(agent_id = auth_user.user_id))]
pub async fn list_showings(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ShowingListItem>>, AppError> {
    let showings = repo::showings::list_for_agent(&state.db, auth_user.user_id).await?;
    Ok(Json(showings.into_iter().map(ShowingListItem::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Showings",
    operation_id = "getShowing",
    summary = "Get a showing with its photos",
    description = "Returns a showing plus its photos, each carrying a signed viewing URL (1 hour). Photos whose URL could not be minted come back with `url: null`.",
    params(("id" = Uuid, Path, description = "Showing ID")),
    responses(
        (status = 200, description = "Showing detail", body = ShowingDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Showing not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(agent_id = auth_user.user_id, id = %id))]
pub async fn get_showing(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShowingDetailResponse>, AppError> {
    let showing = repo::showings::find_for_agent(&state.db, id, auth_user.user_id).await?;
    let photos = repo::showings::photos_for_showing(&state.db, showing.id).await?;

    let paths: Vec<String> = photos.iter().map(|p| p.storage_path.clone()).collect();
    let ttl = state.showing_store.policy().url_ttl_secs;
    let mut urls = state.showing_store.signed_urls(&paths, ttl).await;

    let photos = photos
        .into_iter()
        .map(|p| {
            let url = urls.remove(&p.storage_path);
            ShowingPhotoResponse::with_url(p, url)
        })
        .collect();

    Ok(Json(ShowingDetailResponse {
        showing: ShowingResponse::from(showing),
        photos,
    }))
}
