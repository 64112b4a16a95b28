use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::ensure_object_path;
use super::error::StorageError;
use super::policy::BucketPolicy;
use super::traits::ObjectStore;

/// Filesystem-backed object store used for local runs and tests.
///
/// Objects live at `{root}/{bucket}/{object path}`. Writes go through a
/// `.tmp` staging directory and are moved into place with a rename. Signed
/// URLs are `file://` pseudo-URLs carrying an `expires` query parameter;
/// nothing enforces the expiry, matching S3 presigning being mint-only.
pub struct FilesystemStore {
    base_path: PathBuf,
    bucket: String,
    policy: BucketPolicy,
}

impl FilesystemStore {
    /// Create a store rooted at `{root}/{bucket}`.
    pub async fn new(
        root: impl Into<PathBuf>,
        bucket: &str,
        policy: BucketPolicy,
    ) -> Result<Self, StorageError> {
        let base_path = root.into().join(bucket);
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            bucket: bucket.to_string(),
            policy,
        })
    }

    fn object_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path.trim())
    }

    fn tmp_dir(&self) -> PathBuf {
        self.base_path.join(".tmp")
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.tmp_dir().join(uuid::Uuid::new_v4().to_string())
    }

    fn relative_key(&self, full: &Path) -> Option<String> {
        let rel = full.strip_prefix(&self.base_path).ok()?;
        let mut key = String::new();
        for component in rel.components() {
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(&component.as_os_str().to_string_lossy());
        }
        Some(key)
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    fn bucket_name(&self) -> &str {
        &self.bucket
    }

    fn policy(&self) -> &BucketPolicy {
        &self.policy
    }

    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        ensure_object_path(path)?;
        self.policy.check(bytes.len() as u64, content_type)?;

        let dest = self.object_path(path);
        if fs::try_exists(&dest).await? {
            return Err(StorageError::AlreadyExists(path.trim().to_string()));
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &dest).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(path.trim().to_string())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        ensure_object_path(path)?;
        match fs::read(self.object_path(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.trim().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn signed_url(&self, path: &str, ttl_secs: u32) -> Result<String, StorageError> {
        ensure_object_path(path)?;
        let expires = chrono::Utc::now().timestamp() + i64::from(ttl_secs);
        let full = self.object_path(path);
        Ok(format!("file://{}?expires={expires}", full.display()))
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        ensure_object_path(path)?;
        match fs::remove_file(self.object_path(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Delete(e.to_string())),
        }
    }

    async fn remove_many(&self, paths: &[String]) -> Result<(), StorageError> {
        for path in paths {
            self.remove(path).await?;
        }
        Ok(())
    }

    async fn list_under_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let trimmed = prefix.trim().trim_matches('/');
        if trimmed.contains("..") {
            return Err(StorageError::InvalidPath(trimmed.to_string()));
        }

        let start = if trimmed.is_empty() {
            self.base_path.clone()
        } else {
            self.base_path.join(trimmed)
        };

        let tmp_dir = self.tmp_dir();
        let mut pending = vec![start];
        let mut keys = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let entry_path = entry.path();
                if entry.file_type().await?.is_dir() {
                    if entry_path != tmp_dir {
                        pending.push(entry_path);
                    }
                } else if let Some(key) = self.relative_key(&entry_path) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        match fs::metadata(&self.base_path).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::NotFound(self.bucket.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(self.bucket.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
