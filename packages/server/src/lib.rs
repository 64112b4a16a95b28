pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod export;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod routes;
pub mod sms;
pub mod state;
pub mod trash;
pub mod upload;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Recap API",
        version = "1.0.0",
        description = "API for the Recap record-keeping server"
    ),
    tags(
        (name = "Auth", description = "Authentication and account management"),
        (name = "Showings", description = "Agent-side showing management"),
        (name = "SMS", description = "Feedback link delivery via SMS"),
        (name = "Public Feedback", description = "Buyer-facing showing feedback, keyed by public token"),
        (name = "Recall Cases", description = "Case documentation with soft delete"),
        (name = "Recall Logs", description = "Dated log entries within cases"),
        (name = "Recall Photos", description = "Photo lifecycle: upload, trash, restore, cleanup"),
        (name = "Export", description = "PDF reports and ZIP photo archives"),
        (name = "Storage", description = "Object storage diagnostics"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    router
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}
