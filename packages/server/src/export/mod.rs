//! Export artifacts for recall cases: the PDF report, photo ZIP archives,
//! and the plain-text case summary shipped inside whole-case archives.

pub mod pdf;
pub mod summary;
pub mod zip;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entity::{recall_log, recall_photo};
use crate::error::AppError;

/// Failure while assembling an export artifact. The message is shown to the
/// user as-is.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExportError(pub String);

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err.0)
    }
}

/// A log together with the photo rows resolved for export.
pub struct LogBundle {
    pub log: recall_log::Model,
    pub photos: Vec<recall_photo::Model>,
}

/// en-US short datetime, e.g. `8/25/2026, 2:05:09 PM`. Exports render every
/// timestamp in UTC.
pub(crate) fn us_datetime(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// en-US short date, e.g. `8/25/2026`.
pub(crate) fn us_date(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}
