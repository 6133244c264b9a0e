use crate::domain::entry::{Entry, EntryKind};

/// Outcome of resolving one request path against a snapshot.
///
/// `Redirect` and `NotFound` are normal resolution results, not errors; the
/// HTTP layer maps them to the matching status codes.
#[derive(Debug, PartialEq)]
pub enum Resolution<'a> {
    /// The path names a file; serve or redirect to its object.
    File(&'a Entry),
    /// The path names a folder and carried a trailing separator.
    Folder(&'a Entry),
    /// The path names a folder but lacked the trailing separator; the
    /// client should retry at the corrected path.
    Redirect(String),
    NotFound,
}

/// Walks the snapshot tree to the entry named by `request_path`.
///
/// Segments are matched by linear scan per level. An exact file match is
/// served regardless of trailing slash; a folder match without the trailing
/// slash yields a redirect to the repaired path. The root path always
/// resolves to the root folder, even for an empty tree.
pub fn resolve<'a>(root: &'a Entry, request_path: &str) -> Resolution<'a> {
    let mut node = root;
    for segment in request_path.split('/').filter(|segment| !segment.is_empty()) {
        match node.child(segment) {
            Some(child) => node = child,
            None => return Resolution::NotFound,
        }
    }

    match node.kind {
        EntryKind::File => Resolution::File(node),
        EntryKind::Folder if request_path.is_empty() || request_path.ends_with('/') => {
            Resolution::Folder(node)
        }
        EntryKind::Folder => Resolution::Redirect(format!("{request_path}/")),
    }
}
