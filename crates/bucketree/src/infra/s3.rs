use std::collections::HashMap;

use async_trait::async_trait;
use opendal::Operator;
use opendal::services::S3;
use time::OffsetDateTime;

use crate::config::StorageConfig;
use crate::infra::storage::{ObjectDescriptor, ObjectStore, StorageError};

/// Prefix some backends leave on user metadata keys returned with listings.
const USER_METADATA_PREFIX: &str = "x-amz-meta-";

/// S3-compatible [`ObjectStore`] bound to one bucket.
pub struct S3ObjectStore {
    op: Operator,
}

impl S3ObjectStore {
    /// Builds the adapter from connection settings.
    ///
    /// # Errors
    /// Returns [`StorageError::Unavailable`] when the settings are rejected
    /// by the backend builder.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let builder = S3::default()
            .endpoint(&config.endpoint)
            .region(&config.region)
            .bucket(&config.bucket)
            .access_key_id(&config.access_key_id)
            .secret_access_key(&config.secret_access_key);
        let op = Operator::new(builder)
            .map_err(|error| StorageError::Unavailable(error.to_string()))?
            .finish();

        Ok(Self { op })
    }

    /// Probes the bucket once at startup so misconfiguration fails fast.
    ///
    /// # Errors
    /// Returns [`StorageError::Unavailable`] when the bucket is unreachable.
    pub async fn check(&self) -> Result<(), StorageError> {
        self.op
            .check()
            .await
            .map_err(|error| StorageError::Unavailable(error.to_string()))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self) -> Result<Vec<ObjectDescriptor>, StorageError> {
        let entries = self
            .op
            .list_with("")
            .recursive(true)
            .await
            .map_err(|error| StorageError::Listing(error.to_string()))?;

        let mut objects = Vec::with_capacity(entries.len());
        for entry in entries {
            let metadata = entry.metadata();
            // Listings of prefix-delimited buckets may synthesize directory
            // placeholders; only real objects become tree leaves.
            if metadata.mode().is_dir() {
                continue;
            }

            let last_modified = metadata
                .last_modified()
                .map_or(OffsetDateTime::UNIX_EPOCH, |stamp| {
                    OffsetDateTime::from(std::time::SystemTime::from(stamp))
                });
            let attributes = metadata
                .user_metadata()
                .map(normalize_attributes)
                .unwrap_or_default();

            objects.push(ObjectDescriptor {
                key: entry.path().trim_start_matches('/').to_string(),
                size: metadata.content_length(),
                last_modified,
                attributes,
            });
        }

        Ok(objects)
    }

    async fn read_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let buffer = self
            .op
            .read(key)
            .await
            .map_err(|error| StorageError::Read(error.to_string()))?;

        Ok(buffer.to_vec())
    }
}

/// Lowercases metadata keys and strips the wire-level prefix so the parser
/// sees stable attribute names.
fn normalize_attributes(raw: &HashMap<String, String>) -> HashMap<String, String> {
    raw.iter()
        .map(|(key, value)| {
            let lowered = key.to_ascii_lowercase();
            let stripped = lowered
                .strip_prefix(USER_METADATA_PREFIX)
                .unwrap_or(&lowered)
                .to_string();
            (stripped, value.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_attributes_lowercases_and_strips_prefix() {
        // Arrange
        let mut raw = HashMap::new();
        raw.insert("X-Amz-Meta-Mc-Attrs".to_string(), "atime:1".to_string());
        raw.insert("Plain".to_string(), "value".to_string());

        // Act
        let normalized = normalize_attributes(&raw);

        // Assert
        assert_eq!(
            normalized.get("mc-attrs").map(String::as_str),
            Some("atime:1")
        );
        assert_eq!(normalized.get("plain").map(String::as_str), Some("value"));
    }
}
