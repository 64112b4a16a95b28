mod error;
mod policy;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use filesystem::FilesystemStore;
pub use policy::{BucketPolicy, MimeRule};
#[cfg(feature = "object-storage")]
pub use s3::{S3Settings, S3Store};
pub use traits::ObjectStore;

/// Reject object paths that are blank or escape the bucket namespace.
///
/// Paths are server-generated, so a failure here is a caller bug rather
/// than bad user input.
pub(crate) fn ensure_object_path(path: &str) -> Result<(), StorageError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(StorageError::InvalidPath("path is blank".into()));
    }
    if trimmed.starts_with('/') || trimmed.contains('\\') || trimmed.contains('\0') {
        return Err(StorageError::InvalidPath(trimmed.to_string()));
    }
    if trimmed
        .split('/')
        .any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return Err(StorageError::InvalidPath(trimmed.to_string()));
    }
    Ok(())
}
