use std::collections::HashMap;

use async_trait::async_trait;

use super::error::StorageError;
use super::policy::BucketPolicy;

/// A bucket-scoped, path-addressed object store.
///
/// Object paths are always server-generated; user input never reaches a path
/// beyond a sanitized file extension. Deletion treats a missing object as
/// success so lifecycle flows stay idempotent.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store writes to.
    fn bucket_name(&self) -> &str;

    /// Upload and signing rules for this bucket.
    fn policy(&self) -> &BucketPolicy;

    /// Store bytes at `path`, create-if-absent.
    ///
    /// Returns the stored path. Fails with `AlreadyExists` when an object is
    /// already at `path`, and with `TooLarge`/`UnsupportedType` when the
    /// bucket policy rejects the object.
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Retrieve all bytes of the object at `path`.
    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Mint a time-limited URL for the object at `path`.
    ///
    /// Blank paths are rejected with `InvalidPath`. Like S3 presigning, this
    /// never checks that the object exists; expiry enforcement belongs to
    /// the backing store.
    async fn signed_url(&self, path: &str, ttl_secs: u32) -> Result<String, StorageError>;

    /// Delete the object at `path`. A missing object is success.
    async fn remove(&self, path: &str) -> Result<(), StorageError>;

    /// Delete several objects. Missing objects are success.
    async fn remove_many(&self, paths: &[String]) -> Result<(), StorageError>;

    /// List every object path under `prefix`, recursively.
    async fn list_under_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Probe the bucket for reachability.
    async fn health_check(&self) -> Result<(), StorageError>;

    /// Mint signed URLs for a batch of paths, tolerating partial success.
    ///
    /// Blank paths are skipped up front (orphaned photo rows carry them);
    /// paths whose minting fails are dropped with a warning. The batch call
    /// itself never fails.
    async fn signed_urls(&self, paths: &[String], ttl_secs: u32) -> HashMap<String, String> {
        let mut urls = HashMap::new();
        for path in paths {
            if path.trim().is_empty() {
                continue;
            }
            match self.signed_url(path, ttl_secs).await {
                Ok(url) => {
                    urls.insert(path.clone(), url);
                }
                Err(e) => {
                    tracing::warn!(
                        bucket = self.bucket_name(),
                        path = %path,
                        error = %e,
                        "Dropping signed URL that could not be minted"
                    );
                }
            }
        }
        urls
    }

    /// Remove every object under `prefix`, returning how many were listed.
    async fn purge_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        let paths = self.list_under_prefix(prefix).await?;
        if paths.is_empty() {
            return Ok(0);
        }
        self.remove_many(&paths).await?;
        Ok(paths.len())
    }
}
