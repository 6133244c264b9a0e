use std::future::Future;
use std::pin::Pin;

use crate::domain::entry::{Entry, EntryKind};
use crate::infra::storage::ObjectStore;

/// Boxed future used by the recursive meta-attachment walk.
type AttachFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Fills folder timestamps from their children, bottom-up.
///
/// For each folder: `atime` is the maximum child `atime`, `ctime` the
/// minimum child `ctime`, `mtime` the maximum child `mtime`, computed from
/// the children's already-aggregated values so the result is transitive
/// through depth. Files keep their parsed timestamps; an empty folder stays
/// at the epoch sentinel.
pub fn aggregate_timestamps(entry: &mut Entry) {
    if entry.kind == EntryKind::File {
        return;
    }

    for child in &mut entry.children {
        aggregate_timestamps(child);
    }

    if let Some(max) = entry.children.iter().map(|child| child.atime).max() {
        entry.atime = max;
    }
    if let Some(min) = entry.children.iter().map(|child| child.ctime).min() {
        entry.ctime = min;
    }
    if let Some(max) = entry.children.iter().map(|child| child.mtime).max() {
        entry.mtime = max;
    }
}

/// Attaches meta content to folders that carry a file named `meta_filename`.
///
/// The matching file is marked [`Entry::is_meta_file`] so listings can skip
/// it; its payload is fetched through the store and recorded on the folder.
/// A failed fetch is logged and skips only that folder, the rest of the
/// walk continues.
pub fn attach_meta<'a>(
    folder: &'a mut Entry,
    store: &'a dyn ObjectStore,
    meta_filename: &'a str,
) -> AttachFuture<'a> {
    Box::pin(async move {
        let mut meta_key = None;
        for child in &mut folder.children {
            if child.kind == EntryKind::Folder {
                attach_meta(child, store, meta_filename).await;
            } else if child.name == meta_filename {
                child.is_meta_file = true;
                meta_key = Some(child.full_path());
            }
        }

        if let Some(key) = meta_key {
            match store.read_object(&key).await {
                Ok(payload) => {
                    folder.meta_html = Some(String::from_utf8_lossy(&payload).into_owned());
                }
                Err(error) => {
                    tracing::warn!(%key, %error, "failed to fetch meta content");
                }
            }
        }
    })
}
