use thiserror::Error;

/// Errors that can occur during object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object path is blank or escapes the bucket namespace.
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    /// The object exceeds the bucket's size ceiling.
    #[error("object exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge { actual: u64, limit: u64 },
    /// The content type is not accepted by the bucket policy.
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),
    /// An object already exists at the destination path.
    #[error("object already exists: {0}")]
    AlreadyExists(String),
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(String),
    /// The upload failed in transit.
    #[error("upload failed: {0}")]
    Upload(String),
    /// The download failed in transit.
    #[error("download failed: {0}")]
    Download(String),
    /// The delete failed in transit.
    #[error("delete failed: {0}")]
    Delete(String),
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}
