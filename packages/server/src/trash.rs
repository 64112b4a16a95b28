use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::entity::recall_photo;

/// A photo staged for deletion, held in memory only.
#[derive(Debug, Clone)]
pub struct StagedPhoto {
    pub photo: recall_photo::Model,
    pub trashed_at: DateTime<Utc>,
}

/// In-process photo trash, keyed by owner.
///
/// Staging hides a photo from active views without touching the database;
/// restore puts it back; emptying the trash destroys blob and row. Entries
/// do not survive a restart: the blobs and rows are still there, but the
/// staging markers are gone and the photos reappear as active.
#[derive(Default)]
pub struct PhotoTrash {
    staged: DashMap<i32, Vec<StagedPhoto>>,
}

impl PhotoTrash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a photo. Restaging the same photo refreshes its entry.
    pub fn stage(&self, owner_id: i32, photo: recall_photo::Model) {
        let mut entry = self.staged.entry(owner_id).or_default();
        entry.retain(|s| s.photo.id != photo.id);
        entry.push(StagedPhoto {
            photo,
            trashed_at: Utc::now(),
        });
    }

    /// True when the photo is currently staged.
    pub fn is_staged(&self, owner_id: i32, photo_id: Uuid) -> bool {
        self.staged
            .get(&owner_id)
            .is_some_and(|entry| entry.iter().any(|s| s.photo.id == photo_id))
    }

    /// Staged photos of one log, oldest staging first.
    pub fn list_for_log(&self, owner_id: i32, log_id: Uuid) -> Vec<StagedPhoto> {
        self.staged
            .get(&owner_id)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|s| s.photo.log_id == log_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove one staged photo and hand it back (restore flow).
    pub fn restore(&self, owner_id: i32, photo_id: Uuid) -> Option<StagedPhoto> {
        let mut entry = self.staged.get_mut(&owner_id)?;
        let idx = entry.iter().position(|s| s.photo.id == photo_id)?;
        Some(entry.remove(idx))
    }

    /// Drain every staged photo of one log (empty-trash flow).
    pub fn take_for_log(&self, owner_id: i32, log_id: Uuid) -> Vec<StagedPhoto> {
        let Some(mut entry) = self.staged.get_mut(&owner_id) else {
            return Vec::new();
        };
        let (taken, kept): (Vec<_>, Vec<_>) =
            entry.drain(..).partition(|s| s.photo.log_id == log_id);
        *entry = kept;
        taken
    }

    /// Drop a stale entry after a direct permanent delete.
    pub fn discard(&self, owner_id: i32, photo_id: Uuid) {
        if let Some(mut entry) = self.staged.get_mut(&owner_id) {
            entry.retain(|s| s.photo.id != photo_id);
        }
    }
}
