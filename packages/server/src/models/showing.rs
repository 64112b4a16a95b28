use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{showing, showing_photo};
use crate::error::AppError;
use crate::upload::RejectedFile;

use super::shared::trim_to_none;

/// Feedback statuses a buyer can submit.
pub const FEEDBACK_STATUSES: &[&str] = &["INTERESTED", "MAYBE", "NOT_FOR_US"];

/// Request body for creating a showing.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateShowingRequest {
    /// Buyer's full name.
    #[schema(example = "Jordan Blake")]
    pub buyer_name: String,
    /// Buyer's phone number in E.164 format.
    #[schema(example = "+14155551234")]
    pub buyer_phone: String,
    /// Optional buyer email.
    #[schema(example = "jordan@example.com")]
    pub buyer_email: Option<String>,
    /// Street address of the property shown.
    #[schema(example = "123 Main St")]
    pub address: String,
    #[schema(example = "San Francisco")]
    pub city: String,
    /// Two-letter state code (stored uppercase).
    #[schema(example = "CA")]
    pub state: String,
    /// 5-digit or 9-digit ZIP code.
    #[schema(example = "94105")]
    pub zip: String,
    /// Scheduled time, ISO 8601; naive datetimes are read as UTC.
    #[schema(example = "2025-06-01T14:30:00Z")]
    pub showing_datetime: String,
}

/// Normalized field set produced by [`validate_create_showing`].
pub struct NewShowing {
    pub buyer_name: String,
    pub buyer_phone: String,
    pub buyer_email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub showing_datetime: DateTime<Utc>,
}

pub fn validate_create_showing(req: &CreateShowingRequest) -> Result<NewShowing, AppError> {
    let buyer_name = req.buyer_name.trim();
    let buyer_phone = req.buyer_phone.trim();
    let address = req.address.trim();
    let city = req.city.trim();
    let state = req.state.trim();
    let zip = req.zip.trim();
    let datetime_raw = req.showing_datetime.trim();

    if buyer_name.is_empty()
        || buyer_phone.is_empty()
        || address.is_empty()
        || city.is_empty()
        || state.is_empty()
        || zip.is_empty()
        || datetime_raw.is_empty()
    {
        return Err(AppError::Validation("Missing required fields".into()));
    }
    if !buyer_phone.starts_with('+') || buyer_phone.len() < 10 {
        return Err(AppError::Validation(
            "Phone must be in E.164 format (e.g., +1234567890)".into(),
        ));
    }
    if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Validation(
            "State must be 2 characters (e.g., CA, NY)".into(),
        ));
    }
    if !is_valid_zip(zip) {
        return Err(AppError::Validation(
            "ZIP code must be 5 digits (12345) or 9 digits (12345-6789)".into(),
        ));
    }
    let showing_datetime = parse_showing_datetime(datetime_raw)?;

    Ok(NewShowing {
        buyer_name: buyer_name.to_string(),
        buyer_phone: buyer_phone.to_string(),
        buyer_email: trim_to_none(req.buyer_email.as_deref()),
        address: address.to_string(),
        city: city.to_string(),
        state: state.to_ascii_uppercase(),
        zip: zip.to_string(),
        showing_datetime,
    })
}

fn is_valid_zip(zip: &str) -> bool {
    let bytes = zip.as_bytes();
    match bytes.len() {
        5 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[5] == b'-'
                && bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

/// Parse the showing time, accepting full RFC 3339 or the naive
/// `YYYY-MM-DDTHH:MM[:SS]` shape produced by datetime-local form fields.
pub fn parse_showing_datetime(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(AppError::Validation(
        "Showing date/time must be a valid ISO 8601 datetime".into(),
    ))
}

/// A showing record as returned by every showing endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ShowingResponse {
    pub id: Uuid,
    /// Token addressing the public feedback page (`/r/{token}`).
    pub public_token: Uuid,
    #[schema(example = "Jordan Blake")]
    pub buyer_name: String,
    #[schema(example = "+14155551234")]
    pub buyer_phone: String,
    pub buyer_email: Option<String>,
    #[schema(example = "123 Main St")]
    pub address: String,
    #[schema(example = "San Francisco")]
    pub city: String,
    #[schema(example = "CA")]
    pub state: String,
    #[schema(example = "94105")]
    pub zip: String,
    pub showing_datetime: DateTime<Utc>,
    /// INTERESTED, MAYBE, or NOT_FOR_US once the buyer has responded.
    pub feedback_status: Option<String>,
    pub feedback_note: Option<String>,
    pub feedback_submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<showing::Model> for ShowingResponse {
    fn from(m: showing::Model) -> Self {
        Self {
            id: m.id,
            public_token: m.public_token,
            buyer_name: m.buyer_name,
            buyer_phone: m.buyer_phone,
            buyer_email: m.buyer_email,
            address: m.address,
            city: m.city,
            state: m.state,
            zip: m.zip,
            showing_datetime: m.showing_datetime,
            feedback_status: m.feedback_status,
            feedback_note: m.feedback_note,
            feedback_submitted_at: m.feedback_submitted_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Response for a newly created showing.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateShowingResponse {
    pub showing: ShowingResponse,
    /// Shareable feedback link for the buyer.
    #[schema(example = "https://recap.example.com/r/4a8f…")]
    pub public_url: String,
}

/// List row for the agent dashboard: showing plus photo count.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ShowingListItem {
    pub id: Uuid,
    pub public_token: Uuid,
    pub buyer_name: String,
    pub buyer_phone: String,
    pub buyer_email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub showing_datetime: DateTime<Utc>,
    pub feedback_status: Option<String>,
    pub feedback_note: Option<String>,
    pub feedback_submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[schema(example = 4)]
    pub photo_count: i64,
}

impl From<(showing::Model, i64)> for ShowingListItem {
    fn from((m, photo_count): (showing::Model, i64)) -> Self {
        Self {
            id: m.id,
            public_token: m.public_token,
            buyer_name: m.buyer_name,
            buyer_phone: m.buyer_phone,
            buyer_email: m.buyer_email,
            address: m.address,
            city: m.city,
            state: m.state,
            zip: m.zip,
            showing_datetime: m.showing_datetime,
            feedback_status: m.feedback_status,
            feedback_note: m.feedback_note,
            feedback_submitted_at: m.feedback_submitted_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
            photo_count,
        }
    }
}

/// A showing photo plus a time-limited viewing URL.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ShowingPhotoResponse {
    pub id: Uuid,
    #[schema(example = "kitchen.jpg")]
    pub original_name: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    /// Signed viewing URL (1 hour), or null when minting failed.
    pub url: Option<String>,
}

impl ShowingPhotoResponse {
    pub fn with_url(m: showing_photo::Model, url: Option<String>) -> Self {
        Self {
            id: m.id,
            original_name: m.original_name,
            file_size: m.file_size,
            mime_type: m.mime_type,
            uploaded_at: m.uploaded_at,
            url,
        }
    }
}

/// Showing detail: the record plus its photos with viewing URLs.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ShowingDetailResponse {
    pub showing: ShowingResponse,
    pub photos: Vec<ShowingPhotoResponse>,
}

/// Buyer feedback submission from the public page.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct FeedbackRequest {
    /// INTERESTED, MAYBE, or NOT_FOR_US.
    #[schema(example = "INTERESTED")]
    pub status: String,
    /// Optional free-text note (at most 280 characters).
    #[schema(example = "Loved the kitchen, garage is too small")]
    pub note: Option<String>,
}

/// Normalized feedback produced by [`validate_feedback`].
pub struct FeedbackSubmission {
    pub status: String,
    pub note: Option<String>,
}

pub fn validate_feedback(req: &FeedbackRequest) -> Result<FeedbackSubmission, AppError> {
    let status = req.status.trim();
    if !FEEDBACK_STATUSES.contains(&status) {
        return Err(AppError::Validation(
            "Feedback status must be one of: INTERESTED, MAYBE, NOT_FOR_US".into(),
        ));
    }
    if let Some(ref note) = req.note
        && note.trim().chars().count() > 280
    {
        return Err(AppError::Validation(
            "Note must be at most 280 characters".into(),
        ));
    }
    Ok(FeedbackSubmission {
        status: status.to_string(),
        note: trim_to_none(req.note.as_deref()),
    })
}

/// Batch upload outcome for a showing's public photo upload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ShowingUploadResponse {
    /// Photos stored by this request. `url` is null until the detail
    /// view mints viewing URLs.
    pub uploaded: Vec<ShowingPhotoResponse>,
    /// Files turned away during validation, with the reason for each.
    pub rejected: Vec<RejectedFile>,
}
