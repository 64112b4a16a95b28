use super::error::StorageError;

/// Content types a bucket accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeRule {
    /// Any `image/*` content type.
    AnyImage,
    /// JPEG or PNG only.
    JpegOrPng,
}

impl MimeRule {
    /// Whether `content_type` is acceptable under this rule.
    pub fn accepts(&self, content_type: &str) -> bool {
        let ct = content_type.trim().to_ascii_lowercase();
        match self {
            Self::AnyImage => ct.starts_with("image/"),
            Self::JpegOrPng => matches!(ct.as_str(), "image/jpeg" | "image/jpg" | "image/png"),
        }
    }
}

/// Upload and signing rules for a single bucket.
#[derive(Debug, Clone)]
pub struct BucketPolicy {
    /// Hard ceiling on a single object's size in bytes. Exactly at the
    /// ceiling passes; one byte over fails.
    pub max_object_bytes: u64,
    /// Content types the bucket accepts.
    pub accepted: MimeRule,
    /// Default lifetime of minted signed URLs, in seconds.
    pub url_ttl_secs: u32,
}

impl BucketPolicy {
    /// Recall documentation bucket: 5 MiB cap, any image, 10-minute URLs.
    pub fn recall() -> Self {
        Self {
            max_object_bytes: 5 * 1024 * 1024,
            accepted: MimeRule::AnyImage,
            url_ttl_secs: 600,
        }
    }

    /// Showing photo bucket: 10 MiB cap, JPEG/PNG only, 1-hour URLs.
    pub fn showing() -> Self {
        Self {
            max_object_bytes: 10 * 1024 * 1024,
            accepted: MimeRule::JpegOrPng,
            url_ttl_secs: 3600,
        }
    }

    /// Check a candidate object against this policy.
    pub fn check(&self, size: u64, content_type: &str) -> Result<(), StorageError> {
        if !self.accepted.accepts(content_type) {
            return Err(StorageError::UnsupportedType(content_type.to_string()));
        }
        if size > self.max_object_bytes {
            return Err(StorageError::TooLarge {
                actual: size,
                limit: self.max_object_bytes,
            });
        }
        Ok(())
    }
}
