use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

/// One object from the bucket listing, before parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDescriptor {
    /// Full `/`-delimited object key, e.g. `a/b/c.txt`.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last-modified time reported by the storage backend.
    pub last_modified: OffsetDateTime,
    /// Normalized user metadata: lowercase keys with any `x-amz-meta-`
    /// prefix stripped. Empty when the backend returns none with listings.
    pub attributes: HashMap<String, String>,
}

/// Failures surfaced by storage collaborators.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The bucket listing failed; the current rebuild cycle is aborted and
    /// the previously published snapshot stays in place.
    #[error("object listing failed: {0}")]
    Listing(String),
    /// A single object read failed; tolerated per call site.
    #[error("object read failed: {0}")]
    Read(String),
    /// The backend could not be reached or configured; fatal at startup.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Async boundary to the object-storage backend, bound to one bucket.
///
/// Production uses [`S3ObjectStore`](crate::infra::s3::S3ObjectStore), while
/// tests inject `MockObjectStore` to exercise the indexing pipeline without
/// a live bucket.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists every object in the bucket.
    ///
    /// Listing order is not guaranteed; callers that build a tree must sort
    /// the parsed entries first.
    ///
    /// # Errors
    /// Returns [`StorageError::Listing`] when the backend listing fails.
    async fn list_objects(&self) -> Result<Vec<ObjectDescriptor>, StorageError>;

    /// Reads one object's full payload by key.
    ///
    /// # Errors
    /// Returns [`StorageError::Read`] when the object cannot be fetched.
    async fn read_object(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}
