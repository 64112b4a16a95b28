use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::sms::{SendSmsRequest, SendSmsResponse};
use crate::repo;
use crate::sms::{SmsError, default_feedback_message};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/send",
    tag = "SMS",
    operation_id = "sendSms",
    summary = "Text the feedback link to a showing's buyer",
    description = "Dispatches an SMS to the buyer's phone through the configured provider. When no custom message is given, a default message carrying the public feedback link is built from the showing.",
    request_body = SendSmsRequest,
    responses(
        (status = 200, description = "SMS dispatched", body = SendSmsResponse),
        (status = 400, description = "Provider rejected the dispatch or none configured (SMS_FAILED, SMS_NOT_CONFIGURED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Showing not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(agent_id = auth_user.user_id, showing_id = %payload.showing_id))]
pub async fn send_sms(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SendSmsRequest>,
) -> Result<Json<SendSmsResponse>, AppError> {
    let showing =
        repo::showings::find_for_agent(&state.db, payload.showing_id, auth_user.user_id).await?;

    let public_url = format!(
        "{}/r/{}",
        state.config.server.public_base_url, showing.public_token
    );
    let body = match payload.message.as_deref().map(str::trim) {
        Some(custom) if !custom.is_empty() => custom.to_string(),
        _ => default_feedback_message(&showing.buyer_name, &showing.address, &public_url),
    };

    let outcome = state
        .sms
        .send(&showing.buyer_phone, &body)
        .await
        .map_err(|e| match e {
            SmsError::NotConfigured => AppError::SmsNotConfigured,
            SmsError::Provider(msg) => AppError::SmsFailed(msg),
        })?;

    tracing::info!(sid = %outcome.message_sid, "SMS sent successfully");

    Ok(Json(SendSmsResponse {
        success: true,
        message_sid: outcome.message_sid,
        to: outcome.to,
    }))
}
