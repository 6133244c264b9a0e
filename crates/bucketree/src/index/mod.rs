//! Directory index pipeline: bucket listing → parsed leaves → folder tree →
//! derived metadata → published snapshot.

/// Stack-based tree assembly from sorted file entries.
pub mod builder;
/// Post-processing passes: timestamp aggregation and meta attachment.
pub mod enrich;
/// Object descriptor parsing into file entries.
pub mod parser;
/// Request-path resolution against one snapshot.
pub mod resolver;
/// Snapshot cell and the periodic refresh task.
pub mod snapshot;

use std::sync::Arc;

use crate::domain::entry::Entry;
use crate::infra::storage::{ObjectStore, StorageError};

/// Builds complete directory trees from the bucket contents.
pub struct Indexer {
    store: Arc<dyn ObjectStore>,
    meta_filename: String,
}

impl Indexer {
    pub fn new(store: Arc<dyn ObjectStore>, meta_filename: impl Into<String>) -> Self {
        Self {
            store,
            meta_filename: meta_filename.into(),
        }
    }

    /// Lists the bucket and builds one finished tree: parse (skipping
    /// malformed keys), sort, assemble, aggregate timestamps, attach meta
    /// content.
    ///
    /// # Errors
    /// Returns [`StorageError::Listing`] when the listing fails; the whole
    /// cycle is aborted and no partial tree escapes.
    pub async fn build(&self) -> Result<Entry, StorageError> {
        let objects = self.store.list_objects().await?;

        let mut files = Vec::with_capacity(objects.len());
        for object in &objects {
            match parser::parse_object(object) {
                Ok(entry) => files.push(entry),
                Err(error) => {
                    tracing::warn!(key = %object.key, %error, "skipping unparsable object");
                }
            }
        }

        // The lister's order is not trusted; the builder requires it.
        files.sort_by(builder::key_order);

        let mut tree = builder::build_tree(files);
        enrich::aggregate_timestamps(&mut tree);
        enrich::attach_meta(&mut tree, self.store.as_ref(), &self.meta_filename).await;

        Ok(tree)
    }
}
