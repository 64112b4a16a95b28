use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/showings", showing_routes())
        .nest("/sms", sms_routes())
        .nest("/r", public_routes())
        .nest("/recall", recall_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::auth::*;

    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(me))
}

fn showing_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::showing::*;

    OpenApiRouter::new()
        .routes(routes!(create_showing, list_showings))
        .routes(routes!(get_showing))
}

fn sms_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::sms::*;

    OpenApiRouter::new().routes(routes!(send_sms))
}

/// Buyer-facing routes keyed by public token. No auth, but the photo upload
/// route gets its own body limit.
fn public_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::public::*;

    let feedback = OpenApiRouter::new()
        .routes(routes!(get_public_showing))
        .routes(routes!(submit_feedback));

    let upload = OpenApiRouter::new()
        .routes(routes!(upload_showing_photos))
        .layer(showing_upload_body_limit());

    feedback.merge(upload)
}

fn recall_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::storage::*;

    OpenApiRouter::new()
        .nest("/cases", case_routes())
        .nest("/logs", log_routes())
        .nest("/photos", photo_routes())
        .routes(routes!(storage_health))
}

fn case_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::case::*;
    use crate::handlers::export::*;
    use crate::handlers::log::*;

    OpenApiRouter::new()
        .routes(routes!(list_cases, create_case))
        .routes(routes!(list_deleted_cases))
        .routes(routes!(search_cases))
        .routes(routes!(get_case, update_case, delete_case))
        .routes(routes!(restore_case))
        .routes(routes!(create_log))
        .routes(routes!(export_case_pdf))
        .routes(routes!(export_case_zip))
}

fn log_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::export::*;
    use crate::handlers::log::*;
    use crate::handlers::photo::*;

    let crud = OpenApiRouter::new()
        .routes(routes!(search_logs))
        .routes(routes!(get_log, update_log, delete_log))
        .routes(routes!(list_log_trash, empty_log_trash))
        .routes(routes!(cleanup_photos))
        .routes(routes!(export_log_zip));

    let upload = OpenApiRouter::new()
        .routes(routes!(upload_log_photos))
        .layer(recall_upload_body_limit());

    crud.merge(upload)
}

fn photo_routes() -> OpenApiRouter<AppState> {
    use crate::handlers::photo::*;

    OpenApiRouter::new()
        .routes(routes!(delete_photo))
        .routes(routes!(download_photo))
        .routes(routes!(trash_photo))
        .routes(routes!(restore_photo))
}
