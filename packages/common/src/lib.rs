pub mod storage;

pub use storage::{BucketPolicy, FilesystemStore, MimeRule, ObjectStore, StorageError};
#[cfg(feature = "object-storage")]
pub use storage::{S3Settings, S3Store};
