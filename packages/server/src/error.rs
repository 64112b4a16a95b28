use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `NOT_FOUND`, `CONFLICT`,
    /// `USERNAME_TAKEN`, `UPLOAD_FAILED`, `DOWNLOAD_FAILED`, `DELETE_FAILED`,
    /// `EXPORT_FAILED`, `SMS_NOT_CONFIGURED`, `SMS_FAILED`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Missing required fields")]
    pub error: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    /// Row missing or owned by someone else; the two are indistinguishable
    /// in the response on purpose.
    NotFound(String),
    Conflict(String),
    UsernameTaken,
    /// Blob upload failed in-flight. Message carries the implicated filename.
    Upload(String),
    Download(String),
    Delete(String),
    /// Export pipeline refused to produce an artifact.
    Export(String),
    SmsNotConfigured,
    /// Provider rejected the dispatch; message passed through verbatim.
    SmsFailed(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    error: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    error: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    error: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    error: "Invalid username or password".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    error: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    error: msg,
                },
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "USERNAME_TAKEN",
                    error: "Username is already taken".into(),
                },
            ),
            AppError::Upload(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "UPLOAD_FAILED",
                    error: msg,
                },
            ),
            AppError::Download(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "DOWNLOAD_FAILED",
                    error: msg,
                },
            ),
            AppError::Delete(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    code: "DELETE_FAILED",
                    error: msg,
                },
            ),
            AppError::Export(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    code: "EXPORT_FAILED",
                    error: msg,
                },
            ),
            AppError::SmsNotConfigured => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "SMS_NOT_CONFIGURED",
                    error: "SMS is not configured".into(),
                },
            ),
            AppError::SmsFailed(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "SMS_FAILED",
                    error: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        error: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}
