//! Photo archives. Whole-case exports group photos into one folder per log
//! and carry `case_summary.txt` at the root; single-log exports are flat.
//! Photos that cannot be downloaded are skipped, so the archive ships with
//! whatever succeeded.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use uuid::Uuid;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use common::ObjectStore;

use crate::entity::{recall_case, recall_photo};

use super::{ExportError, LogBundle, summary};

/// Archive every photo of a case, optionally restricted to `photo_ids`.
///
/// Fails before any download when the restriction leaves nothing to export.
/// The summary always covers the whole case, not just the selected photos.
pub async fn case_archive(
    store: &dyn ObjectStore,
    case: &recall_case::Model,
    bundles: &[LogBundle],
    photo_ids: Option<&HashSet<Uuid>>,
) -> Result<Vec<u8>, ExportError> {
    let selected: Vec<(&LogBundle, Vec<&recall_photo::Model>)> = bundles
        .iter()
        .map(|bundle| {
            let photos = bundle
                .photos
                .iter()
                .filter(|p| photo_ids.is_none_or(|ids| ids.contains(&p.id)))
                .collect();
            (bundle, photos)
        })
        .collect();

    if selected.iter().all(|(_, photos)| photos.is_empty()) {
        return Err(ExportError("No photos found to export".into()));
    }

    let mut archive = Archive::new();
    archive.add_entry("case_summary.txt", summary::case_summary(case, bundles).as_bytes())?;

    for (bundle, photos) in selected {
        if photos.is_empty() {
            continue;
        }
        let folder = format!(
            "{}_{}",
            bundle.log.created_at.format("%Y-%m-%d_%H%M"),
            bundle.log.log_type
        );
        for (index, photo) in photos.iter().enumerate() {
            let Some(bytes) = fetch(store, photo).await else {
                continue;
            };
            let name = entry_name(photo, index);
            archive.add_entry(&format!("{folder}/{name}"), &bytes)?;
        }
    }

    archive.finish()
}

/// Flat archive for one log's photos. No folders, no summary.
pub async fn log_archive(
    store: &dyn ObjectStore,
    photos: &[recall_photo::Model],
) -> Result<Vec<u8>, ExportError> {
    if photos.is_empty() {
        return Err(ExportError("No photos found to export".into()));
    }

    let mut archive = Archive::new();
    for (index, photo) in photos.iter().enumerate() {
        let Some(bytes) = fetch(store, photo).await else {
            continue;
        };
        archive.add_entry(&entry_name(photo, index), &bytes)?;
    }
    archive.finish()
}

async fn fetch(store: &dyn ObjectStore, photo: &recall_photo::Model) -> Option<Vec<u8>> {
    match store.download(&photo.storage_path).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(
                photo_id = %photo.id,
                error = %e,
                "Skipping photo that could not be downloaded"
            );
            None
        }
    }
}

/// `original_filename`, or `photo_{n}.jpg` when the upload never carried one.
fn entry_name(photo: &recall_photo::Model, index: usize) -> String {
    photo
        .original_filename
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("photo_{}.jpg", index + 1))
}

struct Archive {
    writer: zip::ZipWriter<Cursor<Vec<u8>>>,
    used_paths: HashSet<String>,
}

impl Archive {
    fn new() -> Self {
        Self {
            writer: zip::ZipWriter::new(Cursor::new(Vec::new())),
            used_paths: HashSet::new(),
        }
    }

    /// Write one entry. Entry paths must be unique within an archive, so a
    /// colliding name gets a numeric suffix.
    fn add_entry(&mut self, path: &str, bytes: &[u8]) -> Result<(), ExportError> {
        let mut unique = path.to_string();
        let mut attempt = 1;
        while self.used_paths.contains(&unique) {
            attempt += 1;
            unique = match path.rsplit_once('.') {
                Some((stem, ext)) => format!("{stem}_{attempt}.{ext}"),
                None => format!("{path}_{attempt}"),
            };
        }
        self.used_paths.insert(unique.clone());

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(unique, options)
            .map_err(|e| zip_failure(&e))?;
        self.writer.write_all(bytes).map_err(|e| zip_failure(&e))?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        let cursor = self.writer.finish().map_err(|e| zip_failure(&e))?;
        Ok(cursor.into_inner())
    }
}

fn zip_failure(detail: &dyn std::fmt::Display) -> ExportError {
    tracing::error!(error = %detail, "ZIP assembly failed");
    ExportError("Failed to create photo archive".into())
}
