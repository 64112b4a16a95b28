use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use super::ensure_object_path;
use super::error::StorageError;
use super::policy::BucketPolicy;
use super::traits::ObjectStore;

/// Connection settings for an S3-compatible endpoint (AWS, MinIO, Supabase).
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Path-style addressing, required by MinIO and most self-hosted stores.
    pub path_style: bool,
}

/// S3-backed object store.
///
/// Upload is head-then-put to keep the create-if-absent contract; the check
/// is not atomic, so uniqueness in practice comes from generated v4 object
/// names.
pub struct S3Store {
    bucket: Box<Bucket>,
    name: String,
    policy: BucketPolicy,
}

impl S3Store {
    pub fn new(
        settings: &S3Settings,
        bucket_name: &str,
        policy: BucketPolicy,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| std::io::Error::other(format!("S3 credentials: {e}")))?;

        let mut bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| std::io::Error::other(format!("S3 bucket init: {e}")))?;
        if settings.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            name: bucket_name.to_string(),
            policy,
        })
    }

    async fn object_exists(&self, path: &str) -> bool {
        match self.bucket.head_object(path).await {
            Ok((_, code)) => (200..300).contains(&code),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket_name(&self) -> &str {
        &self.name
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

        let path = path.trim();
        if self.object_exists(path).await {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }

        self.bucket
            .put_object_with_content_type(path, bytes, content_type)
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(path.to_string())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        ensure_object_path(path)?;
        match self.bucket.get_object(path.trim()).await {
            Ok(data) => Ok(data.bytes().to_vec()),
            Err(S3Error::HttpFailWithBody(404, _)) => {
                Err(StorageError::NotFound(path.trim().to_string()))
            }
            Err(e) => Err(StorageError::Download(e.to_string())),
        }
    }

    async fn signed_url(&self, path: &str, ttl_secs: u32) -> Result<String, StorageError> {
        ensure_object_path(path)?;
        self.bucket
            .presign_get(path.trim(), ttl_secs, None)
            .await
            .map_err(|e| StorageError::Download(format!("presign: {e}")))
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        ensure_object_path(path)?;
        match self.bucket.delete_object(path.trim()).await {
            // S3 DELETE returns 204 whether or not the key existed.
            Ok(_) => Ok(()),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(()),
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
        let list_prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        };

        let pages = self
            .bucket
            .list(list_prefix, None)
            .await
            .map_err(|e| StorageError::Download(format!("list: {e}")))?;

        let mut keys: Vec<String> = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| object.key)
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.bucket
            .list_page(String::new(), None, None, None, Some(1))
            .await
            .map(|_| ())
            .map_err(|e| StorageError::Download(format!("health: {e}")))
    }
}
