use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for dispatching the feedback-link SMS.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SendSmsRequest {
    /// Showing whose buyer should receive the link.
    pub showing_id: Uuid,
    /// Custom message body. When omitted, a default message linking to
    /// the public feedback page is built from the showing.
    pub message: Option<String>,
}

/// Result of an SMS dispatch.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SendSmsResponse {
    #[schema(example = true)]
    pub success: bool,
    /// Provider message identifier.
    #[schema(example = "SM9f24f6875b414f239042ba53bb761b59")]
    pub message_sid: String,
    /// Recipient phone number.
    #[schema(example = "+14155551234")]
    pub to: String,
}
